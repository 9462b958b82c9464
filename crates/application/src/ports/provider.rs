//! Identity provider ports
//!
//! The provider SDK is treated as an opaque capability set: sign-in,
//! sign-out, session and user retrieval, and a callback-style session
//! refresh. Sessions are live objects; credentials read from them are
//! never cached by the scheme.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use sessionkit_domain::{CredentialSource, LoginCredentials};

use crate::error::ProviderError;

/// A provider-issued session.
pub trait ProviderSession: Send + Sync + fmt::Debug {
    /// The identity token, if issued.
    fn id_token(&self) -> Option<String>;

    /// The access token, if issued.
    fn access_token(&self) -> Option<String>;

    /// The refresh token, if issued.
    fn refresh_token(&self) -> Option<String>;

    /// Reads the credential named by `source`.
    fn credential(&self, source: CredentialSource) -> Option<String> {
        match source {
            CredentialSource::IdToken => self.id_token(),
            CredentialSource::AccessToken => self.access_token(),
            CredentialSource::RefreshToken => self.refresh_token(),
        }
    }
}

/// Shared handle to a live provider session.
pub type SharedSession = Arc<dyn ProviderSession>;

/// The provider's authenticated user handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUser {
    /// Provider username.
    pub username: String,
}

impl ProviderUser {
    /// Creates a user handle.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// Completion callback of [`IdentityProvider::refresh_session`].
pub type RefreshCallback = Box<dyn FnOnce(Result<SharedSession, ProviderError>) + Send>;

/// Item storage the provider SDK persists its own session keys in.
pub trait SessionStorage: Send + Sync {
    /// Stores `value` under `key`.
    fn set_item(&self, key: &str, value: &str);

    /// Reads `key`.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Removes `key`.
    fn remove_item(&self, key: &str);

    /// Removes every key of the last authenticated user.
    fn clear(&self);
}

/// Identity provider SDK capabilities used by the scheme.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Hands the provider the storage it should persist sessions in.
    fn attach_storage(&self, _storage: Arc<dyn SessionStorage>) {}

    /// Signs in and returns the new session.
    async fn sign_in(&self, credentials: &LoginCredentials) -> Result<SharedSession, ProviderError>;

    /// Signs the current user out.
    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Returns the current session, if any.
    async fn current_session(&self) -> Result<Option<SharedSession>, ProviderError>;

    /// Returns the current authenticated user, if any.
    async fn current_authenticated_user(&self) -> Result<Option<ProviderUser>, ProviderError>;

    /// Starts a session refresh for `user`; `callback` receives the outcome.
    ///
    /// The call returns as soon as the refresh has been started.
    fn refresh_session(&self, user: &ProviderUser, refresh_token: &str, callback: RefreshCallback);
}
