//! Process state mirrored to a storage medium.

use std::collections::HashMap;

use parking_lot::RwLock;
use sessionkit_application::ports::ExpiryStore;
use sessionkit_domain::StoredValue;
use tracing::{trace, warn};

use super::StorageMedium;

/// [`ExpiryStore`] over a [`StorageMedium`].
///
/// Reads are served from process state, falling back to the medium for keys
/// this process has not seen yet. Writes go to both. A failing medium is
/// logged and leaves process state authoritative.
#[derive(Debug)]
pub struct UniversalStorage<M> {
    state: RwLock<HashMap<String, StoredValue>>,
    medium: M,
}

impl<M: StorageMedium> UniversalStorage<M> {
    /// Creates a store with empty process state over `medium`.
    pub fn new(medium: M) -> Self {
        Self {
            state: RwLock::new(HashMap::new()),
            medium,
        }
    }

    /// The backing medium.
    pub const fn medium(&self) -> &M {
        &self.medium
    }
}

impl<M: StorageMedium> ExpiryStore for UniversalStorage<M> {
    fn get_universal(&self, key: &str) -> Option<StoredValue> {
        if let Some(value) = self.state.read().get(key) {
            return Some(value.clone());
        }

        match self.medium.read(key) {
            Ok(Some(value)) => {
                self.state.write().insert(key.to_string(), value.clone());
                Some(value)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "failed to read persisted value");
                None
            }
        }
    }

    fn set_universal(&self, key: &str, value: StoredValue) -> StoredValue {
        self.state.write().insert(key.to_string(), value.clone());
        if let Err(e) = self.medium.write(key, &value) {
            warn!(key, error = %e, "failed to persist value");
        }
        trace!(key, ?value, "value stored");
        value
    }

    fn sync_universal(&self, key: &str) -> Option<StoredValue> {
        match self.medium.read(key) {
            Ok(Some(value)) => {
                self.state.write().insert(key.to_string(), value.clone());
                Some(value)
            }
            Ok(None) => {
                self.state.write().remove(key);
                None
            }
            Err(e) => {
                warn!(key, error = %e, "failed to sync value, keeping process state");
                self.state.read().get(key).cloned()
            }
        }
    }

    fn remove_universal(&self, key: &str) {
        self.state.write().remove(key);
        if let Err(e) = self.medium.remove(key) {
            warn!(key, error = %e, "failed to remove persisted value");
        }
    }
}
