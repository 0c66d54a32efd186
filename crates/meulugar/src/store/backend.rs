use crate::error::Result;

/// Abstract interface for the small synchronous record medium.
///
/// This trait handles the "how" of storing short JSON strings by key
/// (filesystem vs memory), while [`PlaceStore`](super::place_store::PlaceStore)
/// handles the "what" (place collection semantics, defaulting, boolean results).
///
/// Every implementation enforces a total byte quota across all keys: a write
/// that would push the total over the limit fails with
/// [`LugarError::QuotaExceeded`](crate::error::LugarError::QuotaExceeded)
/// and leaves the previous value in place.
pub trait RecordBackend {
    /// Read the value stored under `key`.
    /// Returns Ok(None) if nothing was ever written (or it was removed).
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    /// MUST be atomic: readers see either the old or the new value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Total bytes currently stored across all keys.
    fn used_bytes(&self) -> Result<u64>;

    /// The configured byte quota.
    fn quota_bytes(&self) -> u64;
}

/// Shared quota arithmetic: bytes in use once `key` holds `new_len` bytes.
pub(crate) fn projected_usage(used: u64, previous_len: u64, new_len: u64) -> u64 {
    used.saturating_sub(previous_len) + new_len
}
