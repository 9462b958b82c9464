//! Refresh credential lifecycle.

use sessionkit_domain::{Expiration, RefreshTokenConfig, SchemeConfig, TokenStatus};
use tracing::debug;

use super::expiration::{ExpirationTracker, TokenContext, with_prefix};
use crate::error::{AuthError, AuthResult};
use crate::ports::SharedSession;

/// The refresh credential of a provider session.
///
/// Same lifecycle as [`super::AccessToken`], without header synchronization.
pub struct RefreshToken {
    session: SharedSession,
    config: RefreshTokenConfig,
    expiration: ExpirationTracker,
}

impl RefreshToken {
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
    ) -> AuthResult<Self> {
        let session = session.ok_or(AuthError::MissingSession)?;
        let token = Self {
            session,
            config: scheme.refresh_token.clone(),
            expiration: ExpirationTracker::new(
                scheme.refresh_token_expiration_key(),
                scheme.refresh_token.max_age,
                context,
            ),
        };
        token.update()?;
        Ok(token)
    }

    /// Re-reads the credential and recomputes its expiration.
    ///
    /// # Errors
    ///
    /// Returns a domain error if the token carries a malformed expiry claim.
    pub fn update(&self) -> AuthResult<Option<String>> {
        let Some(token) = self.prefixed() else {
            self.expiration.set(Expiration::Cleared);
            return Ok(None);
        };

        let expiration = self.expiration.update(&token)?;
        debug!(key = self.expiration.key(), expires_at = ?expiration.millis(), "refresh token updated");

        Ok(Some(token))
    }

    /// Reconciles the stored expiration with the medium.
    pub fn sync(&self) -> Option<String> {
        let token = self.prefixed();
        self.expiration.sync();
        token
    }

    /// Clears the stored expiration.
    pub fn reset(&self) {
        self.expiration.set(Expiration::Cleared);
    }

    /// Validity of the credential now.
    #[must_use]
    pub fn status(&self) -> TokenStatus {
        self.expiration.status(self.get().as_deref())
    }

    /// The raw credential read live from the session.
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

    fn prefixed(&self) -> Option<String> {
        self.get()
            .map(|raw| with_prefix(self.config.prefix(), &raw))
    }
}

impl std::fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshToken")
            .field("key", &self.expiration.key())
            .field("expiration", &self.expiration.get())
            .finish_non_exhaustive()
    }
}
