//! Access credential lifecycle.
//!
//! The access credential is read live from the provider session, emitted
//! with its scheme prefix into the request header sink, and tracked with an
//! expiration persisted in the universal store.

use std::sync::Arc;

use sessionkit_domain::{Expiration, SchemeConfig, TokenConfig, TokenStatus};
use tracing::debug;

use super::expiration::{ExpirationTracker, TokenContext, with_prefix};
use crate::error::{AuthError, AuthResult};
use crate::ports::{HeaderSink, SharedSession};

/// The access credential of a provider session.
pub struct AccessToken {
    session: SharedSession,
    config: TokenConfig,
    expiration: ExpirationTracker,
    headers: Arc<dyn HeaderSink>,
}

impl AccessToken {
    /// Builds the credential from `session` and immediately runs [`Self::update`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingSession`] if `session` is `None`, or a
    /// domain error if the token carries a malformed expiry claim.
    pub fn new(
        session: Option<SharedSession>,
        scheme: &SchemeConfig,
        context: TokenContext,
        headers: Arc<dyn HeaderSink>,
    ) -> AuthResult<Self> {
        let session = session.ok_or(AuthError::MissingSession)?;
        let token = Self {
            session,
            config: scheme.token.clone(),
            expiration: ExpirationTracker::new(
                scheme.token_expiration_key(),
                scheme.token.max_age,
                context,
            ),
            headers,
        };
        token.update()?;
        Ok(token)
    }

    /// Re-reads the credential, recomputes its expiration and pushes it into
    /// the header sink. The header is left untouched if the expiration
    /// cannot be computed.
    ///
    /// Returns the prefixed value, or `None` if the session holds no credential.
    ///
    /// # Errors
    ///
    /// Returns a domain error if the token carries a malformed expiry claim.
    pub fn update(&self) -> AuthResult<Option<String>> {
        let Some(token) = self.prefixed() else {
            self.headers.clear_header();
            self.expiration.set(Expiration::Cleared);
            debug!(key = self.expiration.key(), "access token missing from session");
            return Ok(None);
        };

        let expiration = self.expiration.update(&token)?;
        self.headers.set_header(&token);
        debug!(key = self.expiration.key(), expires_at = ?expiration.millis(), "access token updated");

        Ok(Some(token))
    }

    /// Reasserts the header from the live session and reconciles the stored
    /// expiration with the medium without recomputing it.
    pub fn sync(&self) -> Option<String> {
        let token = self.prefixed();
        match &token {
            Some(token) => self.headers.set_header(token),
            None => self.headers.clear_header(),
        }
        self.expiration.sync();
        token
    }

    /// Clears the stored expiration and removes the header.
    pub fn reset(&self) {
        self.expiration.set(Expiration::Cleared);
        self.headers.clear_header();
    }

    /// Validity of the credential now.
    #[must_use]
    pub fn status(&self) -> TokenStatus {
        self.expiration.status(self.get().as_deref())
    }

    /// The raw, unprefixed credential read live from the session.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.session
            .credential(self.config.property)
            .filter(|value| !value.is_empty())
    }

    /// The stored expiration.
    #[must_use]
    pub fn expiration(&self) -> Expiration {
        self.expiration.get()
    }

    /// The session this credential reads from.
    #[must_use]
    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    fn prefixed(&self) -> Option<String> {
        self.get()
            .map(|raw| with_prefix(self.config.prefix(), &raw))
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("key", &self.expiration.key())
            .field("expiration", &self.expiration.get())
            .finish_non_exhaustive()
    }
}
