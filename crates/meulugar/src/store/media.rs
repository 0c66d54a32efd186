use crate::error::Result;
use async_trait::async_trait;

/// Asynchronous store for photo and audio blobs.
///
/// Separate from [`RecordBackend`](super::backend::RecordBackend):
/// blobs can be far larger than the record medium allows, and every call may
/// suspend. Payloads are opaque bytes; the content type travels with the caller.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `data` under `key`, overwriting any previous blob.
    async fn save_media(&self, key: &str, data: &[u8]) -> Result<()>;

    /// Fetch the blob under `key`. A missing key is `Ok(None)`, not an error.
    async fn get_media(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Remove the blob under `key`. Removing a missing key succeeds.
    async fn delete_media(&self, key: &str) -> Result<()>;

    /// Every key currently stored.
    async fn list_keys(&self) -> Result<Vec<String>>;
}
