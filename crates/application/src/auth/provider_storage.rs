//! Item storage handed to the provider SDK.
//!
//! The provider keeps its own session keys (`<prefix><user>.idToken` and
//! friends) in the same universal store as the scheme, so a reload or a
//! second context sees one consistent session.

use std::sync::Arc;

use sessionkit_domain::StoredValue;
use tracing::debug;

use crate::ports::{ExpiryStore, SessionStorage};

const LAST_AUTH_USER: &str = "LastAuthUser";
const USER_KEYS: [&str; 4] = ["accessToken", "clockDrift", "idToken", "refreshToken"];

/// [`SessionStorage`] backed by an [`ExpiryStore`].
pub struct ProviderStorage {
    store: Arc<dyn ExpiryStore>,
    prefix: String,
}

impl ProviderStorage {
    /// Creates the adapter; `prefix` is the provider's key namespace,
    /// e.g. `auth.<service>.<client id>.`.
    #[must_use]
    pub fn new(store: Arc<dyn ExpiryStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// The provider key namespace.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl SessionStorage for ProviderStorage {
    fn set_item(&self, key: &str, value: &str) {
        self.store.set_universal(key, StoredValue::from(value));
    }

    fn get_item(&self, key: &str) -> Option<String> {
        match self.store.get_universal(key)? {
            StoredValue::Text(text) => Some(text),
            StoredValue::Millis(value) => Some(value.to_string()),
            StoredValue::Flag(_) => None,
        }
    }

    fn remove_item(&self, key: &str) {
        self.store.remove_universal(key);
    }

    fn clear(&self) {
        let last_user_key = format!("{}{LAST_AUTH_USER}", self.prefix);
        let Some(user) = self.get_item(&last_user_key).filter(|user| !user.is_empty()) else {
            return;
        };

        self.remove_item(&last_user_key);
        for name in USER_KEYS {
            self.remove_item(&format!("{}{user}.{name}", self.prefix));
        }
        debug!(prefix = %self.prefix, "provider session keys cleared");
    }
}
