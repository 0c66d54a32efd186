use super::backend::{projected_usage, RecordBackend};
use crate::error::{LugarError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Filesystem record backend: one `<key>.json` file per key under `root`.
pub struct FsBackend {
    root: PathBuf,
    quota: u64,
}

impl FsBackend {
    pub fn new(root: PathBuf, quota: u64) -> Self {
        Self { root, quota }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn item_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.json", key)))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(LugarError::Io)?;
        }
        Ok(())
    }

    fn file_len(path: &Path) -> Result<u64> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(LugarError::Io(e)),
        }
    }
}

pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty()
        || key.contains('/')
        || key.contains('\\')
        || key.contains("..")
        || key.starts_with('.')
    {
        return Err(LugarError::InvalidKey(key.to_string()));
    }
    Ok(())
}

impl RecordBackend for FsBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.item_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(LugarError::Io)?;
        Ok(Some(content))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let target = self.item_path(key)?;
        self.ensure_dir()?;

        let needed = projected_usage(
            self.used_bytes()?,
            Self::file_len(&target)?,
            value.len() as u64,
        );
        if needed > self.quota {
            return Err(LugarError::QuotaExceeded {
                needed,
                quota: self.quota,
            });
        }

        // Atomic write
        let tmp = self.root.join(format!(".{}-{}.tmp", key, Uuid::new_v4()));
        fs::write(&tmp, value).map_err(LugarError::Io)?;
        if let Err(e) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(LugarError::Io(e));
        }

        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.item_path(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LugarError::Io(e)),
        }
    }

    fn used_bytes(&self) -> Result<u64> {
        if !self.root.exists() {
            return Ok(0);
        }

        let mut total = 0;
        for entry in fs::read_dir(&self.root).map_err(LugarError::Io)? {
            let entry = entry.map_err(LugarError::Io)?;
            let path = entry.path();
            let is_item = path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some("json")
                && !path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with('.'));
            if is_item {
                total += entry.metadata().map_err(LugarError::Io)?.len();
            }
        }
        Ok(total)
    }

    fn quota_bytes(&self) -> u64 {
        self.quota
    }
}
