//! Universal store port

use sessionkit_domain::StoredValue;

/// Key/value persistence that survives reloads.
///
/// "Universal" values live both in process state and in an underlying
/// medium (cookie jar, local file, shared memory) that other contexts may
/// write to concurrently.
pub trait ExpiryStore: Send + Sync {
    /// Reads the current value of `key`.
    fn get_universal(&self, key: &str) -> Option<StoredValue>;

    /// Writes `value` under `key` to state and medium, returning the stored value.
    fn set_universal(&self, key: &str, value: StoredValue) -> StoredValue;

    /// Re-reads `key` from the underlying medium, updating process state.
    ///
    /// Returns the reconciled value.
    fn sync_universal(&self, key: &str) -> Option<StoredValue>;

    /// Removes `key` from state and medium.
    fn remove_universal(&self, key: &str);
}
