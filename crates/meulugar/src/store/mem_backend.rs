use super::backend::{projected_usage, RecordBackend};
use crate::error::{LugarError, Result};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Default quota for in-memory backends.
pub const DEFAULT_MEM_QUOTA: u64 = 5 * 1024 * 1024;

/// In-memory record backend for testing.
///
/// Uses `RefCell` for interior mutability; the record store is only touched
/// from one thread.
pub struct MemBackend {
    items: RefCell<HashMap<String, String>>,
    quota: u64,
    simulate_write_error: RefCell<bool>,
    failing_keys: RefCell<HashSet<String>>,
}

impl Default for MemBackend {
    fn default() -> Self {
        Self::with_quota(DEFAULT_MEM_QUOTA)
    }
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: u64) -> Self {
        Self {
            items: RefCell::new(HashMap::new()),
            quota,
            simulate_write_error: RefCell::new(false),
            failing_keys: RefCell::new(HashSet::new()),
        }
    }

    /// Enable write error simulation for every key.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Enable write error simulation for a single key only.
    pub fn set_simulate_write_error_for(&self, key: &str, simulate: bool) {
        let mut keys = self.failing_keys.borrow_mut();
        if simulate {
            keys.insert(key.to_string());
        } else {
            keys.remove(key);
        }
    }

    /// Test helper to plant a raw value, bypassing the quota.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn write_blocked(&self, key: &str) -> bool {
        *self.simulate_write_error.borrow() || self.failing_keys.borrow().contains(key)
    }
}

impl RecordBackend for MemBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if self.write_blocked(key) {
            return Err(LugarError::Store("Simulated write error".to_string()));
        }

        let previous = self
            .items
            .borrow()
            .get(key)
            .map(|v| v.len() as u64)
            .unwrap_or(0);
        let needed = projected_usage(self.used_bytes()?, previous, value.len() as u64);
        if needed > self.quota {
            return Err(LugarError::QuotaExceeded {
                needed,
                quota: self.quota,
            });
        }

        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        if self.write_blocked(key) {
            return Err(LugarError::Store("Simulated write error".to_string()));
        }
        self.items.borrow_mut().remove(key);
        Ok(())
    }

    fn used_bytes(&self) -> Result<u64> {
        Ok(self.items.borrow().values().map(|v| v.len() as u64).sum())
    }

    fn quota_bytes(&self) -> u64 {
        self.quota
    }
}
