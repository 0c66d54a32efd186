use super::fs_backend::validate_key;
use super::media::MediaStore;
use crate::error::{LugarError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

const BLOB_EXT: &str = "bin";

/// Filesystem attachment store.
///
/// Blobs live as `{root}/{key}.bin`. Writes go to a temp file first and are
/// renamed into place, so a crashed save never leaves a truncated blob behind
/// under a real key.
pub struct FsMediaStore {
    root: PathBuf,
    max_blob_bytes: Option<u64>,
}

impl FsMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_blob_bytes: None,
        }
    }

    /// Reject blobs larger than `limit` bytes with `QuotaExceeded`.
    pub fn with_max_blob_bytes(mut self, limit: u64) -> Self {
        self.max_blob_bytes = Some(limit);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.{}", key, BLOB_EXT)))
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn save_media(&self, key: &str, data: &[u8]) -> Result<()> {
        let target = self.blob_path(key)?;
        if let Some(limit) = self.max_blob_bytes {
            if data.len() as u64 > limit {
                return Err(LugarError::QuotaExceeded {
                    needed: data.len() as u64,
                    quota: limit,
                });
            }
        }
        debug!(key, size = data.len(), "media_store: write");

        fs::create_dir_all(&self.root).await.map_err(|e| {
            warn!(root = %self.root.display(), error = %e, "media_store: create_dir_all failed");
            e
        })?;

        // Atomic write: temp file + rename
        let temp_path = self.root.join(format!(".{}-{}.tmp", key, Uuid::new_v4()));
        let mut file = fs::File::create(&temp_path).await?;
        let written = async {
            file.write_all(data).await?;
            file.sync_all().await
        }
        .await;
        drop(file);
        if let Err(e) = written {
            warn!(key, error = %e, "media_store: write_all failed");
            let _ = fs::remove_file(&temp_path).await;
            return Err(LugarError::Io(e));
        }

        fs::rename(&temp_path, &target).await.map_err(|e| {
            warn!(from = %temp_path.display(), to = %target.display(), error = %e, "media_store: rename failed");
            e
        })?;
        Ok(())
    }

    async fn get_media(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.blob_path(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LugarError::Io(e)),
        }
    }

    async fn delete_media(&self, key: &str) -> Result<()> {
        let path = self.blob_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key, "media_store: deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LugarError::Io(e)),
        }
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(LugarError::Io(e)),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            if let Some(key) = name.strip_suffix(&format!(".{}", BLOB_EXT)) {
                keys.push(key.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}
