//! # Configuration
//!
//! Meu Lugar configuration is managed by [`confique`], which layers
//! environment variables over a TOML file over compiled defaults.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `MEULUGAR_DATA_DIR`, `MEULUGAR_RECORD_QUOTA`, ...
//! 2. **Config file**: `meulugar.toml` in the OS config directory (via `directories`).
//! 3. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Env | Default | Description |
//! |-----|-----|---------|-------------|
//! | `data_dir` | `MEULUGAR_DATA_DIR` | OS data dir | Root holding `records/` and `media/` |
//! | `record_quota_bytes` | `MEULUGAR_RECORD_QUOTA` | 5 MiB | Total size allowed in the record medium |
//! | `media_max_bytes` | `MEULUGAR_MEDIA_MAX_BYTES` | 50 MiB | Largest single attachment |
//! | `cascade_media_delete` | `MEULUGAR_CASCADE_MEDIA_DELETE` | `false` | Deleting a place also deletes its attachments |
//! | `log_level` | `MEULUGAR_LOG` | `warn` | Filter used when `RUST_LOG` is unset |

use crate::error::{LugarError, Result};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "meulugar.toml";

pub const DEFAULT_RECORD_QUOTA: u64 = 5 * 1024 * 1024;
pub const DEFAULT_MEDIA_MAX_BYTES: u64 = 50 * 1024 * 1024;

/// Configuration for meulugar, stored in `meulugar.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct MeuLugarConfig {
    /// Directory holding `records/` and `media/`. Defaults to the OS data dir.
    #[config(env = "MEULUGAR_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Total bytes the record medium may hold across all keys.
    #[config(env = "MEULUGAR_RECORD_QUOTA", default = 5242880)]
    pub record_quota_bytes: u64,

    /// Largest single photo or audio blob accepted.
    #[config(env = "MEULUGAR_MEDIA_MAX_BYTES", default = 52428800)]
    pub media_max_bytes: u64,

    /// Delete a place's attachments together with the place.
    #[config(env = "MEULUGAR_CASCADE_MEDIA_DELETE", default = false)]
    pub cascade_media_delete: bool,

    /// Log filter (`error`, `warn`, `info`, `debug`, `trace` or a directive list).
    #[config(env = "MEULUGAR_LOG", default = "warn")]
    pub log_level: String,
}

impl Default for MeuLugarConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            record_quota_bytes: DEFAULT_RECORD_QUOTA,
            media_max_bytes: DEFAULT_MEDIA_MAX_BYTES,
            cascade_media_delete: false,
            log_level: "warn".to_string(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("app", "meulugar", "meulugar")
}

impl MeuLugarConfig {
    /// Load from the environment and the global config file.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::global_config_file().as_deref())
    }

    /// Load from the environment and `file`, if given. A missing file is
    /// skipped.
    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = file {
            builder = builder.file(path);
        }
        builder
            .load()
            .map_err(|e| LugarError::Config(e.to_string()))
    }

    pub fn global_config_file() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// The configured data directory, else the OS data directory.
    pub fn data_dir(&self) -> Result<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
            .ok_or_else(|| LugarError::Config("could not determine a data directory".into()))
    }

    /// A commented sample `meulugar.toml`.
    pub fn template() -> String {
        confique::toml::template::<Self>(confique::toml::FormatOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = MeuLugarConfig::default();
        assert_eq!(config.record_quota_bytes, 5 * 1024 * 1024);
        assert_eq!(config.media_max_bytes, 50 * 1024 * 1024);
        assert!(!config.cascade_media_delete);
        assert_eq!(config.log_level, "warn");
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let config = MeuLugarConfig {
            data_dir: Some(PathBuf::from("/tmp/lugar")),
            ..Default::default()
        };
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/lugar"));
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "record_quota_bytes = 1024\ncascade_media_delete = true\n",
        )
        .unwrap();

        let config = MeuLugarConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config.record_quota_bytes, 1024);
        assert!(config.cascade_media_delete);
        assert_eq!(config.media_max_bytes, DEFAULT_MEDIA_MAX_BYTES);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = MeuLugarConfig::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.media_max_bytes, DEFAULT_MEDIA_MAX_BYTES);
    }

    #[test]
    fn test_partial_toml_uses_serde_defaults() {
        let config: MeuLugarConfig = toml::from_str("log_level = \"debug\"").unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.record_quota_bytes, DEFAULT_RECORD_QUOTA);
    }

    #[test]
    fn test_template_lists_every_key() {
        let template = MeuLugarConfig::template();
        for key in [
            "data_dir",
            "record_quota_bytes",
            "media_max_bytes",
            "cascade_media_delete",
            "log_level",
        ] {
            assert!(template.contains(key), "missing {key}");
        }
    }
}
