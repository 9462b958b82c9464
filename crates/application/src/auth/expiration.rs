//! Expiration bookkeeping shared by both credential kinds.

use std::sync::Arc;

use sessionkit_domain::{Expiration, TokenStatus, resolve_expiration};

use crate::error::AuthResult;
use crate::ports::{Clock, ExpiryStore};

/// Store and clock a credential persists its expiration with.
#[derive(Clone)]
pub struct TokenContext {
    /// Universal store holding expirations.
    pub store: Arc<dyn ExpiryStore>,
    /// Time source for expiry decisions.
    pub clock: Arc<dyn Clock>,
}

impl TokenContext {
    /// Bundles a store and a clock.
    #[must_use]
    pub fn new(store: Arc<dyn ExpiryStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

/// Reads and writes one credential's expiration under a fixed key.
pub(crate) struct ExpirationTracker {
    key: String,
    max_age: u64,
    context: TokenContext,
}

impl ExpirationTracker {
    pub(crate) const fn new(key: String, max_age: u64, context: TokenContext) -> Self {
        Self {
            key,
            max_age,
            context,
        }
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn get(&self) -> Expiration {
        Expiration::from_stored(self.context.store.get_universal(&self.key).as_ref())
    }

    pub(crate) fn set(&self, expiration: Expiration) {
        self.context
            .store
            .set_universal(&self.key, expiration.to_stored());
    }

    pub(crate) fn sync(&self) -> Expiration {
        Expiration::from_stored(self.context.store.sync_universal(&self.key).as_ref())
    }

    /// Recomputes the expiration of `token` and persists it.
    pub(crate) fn update(&self, token: &str) -> AuthResult<Expiration> {
        let millis = resolve_expiration(token, self.max_age, self.context.clock.now_millis())?;
        let expiration = Expiration::from_millis(millis);
        self.set(expiration);
        Ok(expiration)
    }

    pub(crate) fn status(&self, value: Option<&str>) -> TokenStatus {
        TokenStatus::evaluate(value, self.get(), self.context.clock.now_millis())
    }
}

/// Prepends `prefix` to `raw`, separated by a space.
pub(crate) fn with_prefix(prefix: Option<&str>, raw: &str) -> String {
    prefix.map_or_else(|| raw.to_string(), |prefix| format!("{prefix} {raw}"))
}
