use super::media::MediaStore;
use crate::error::{LugarError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// In-memory attachment store for testing.
#[derive(Default)]
pub struct MemMediaStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    simulate_write_error: AtomicBool,
}

impl MemMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every save and delete fail, for exercising error paths.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(LugarError::Store("Simulated media write error".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MediaStore for MemMediaStore {
    async fn save_media(&self, key: &str, data: &[u8]) -> Result<()> {
        self.check_writable()?;
        self.blobs
            .write()
            .await
            .insert(key.to_string(), data.to_vec());
        Ok(())
    }

    async fn get_media(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.read().await.get(key).cloned())
    }

    async fn delete_media(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        self.blobs.write().await.remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.blobs.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
