//! Application error types

use thiserror::Error;
use sessionkit_domain::DomainError;

/// Errors reported by the identity provider.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider rejected the credentials.
    #[error("sign-in rejected: {0}")]
    SignInRejected(String),

    /// No user is signed in.
    #[error("no authenticated user")]
    NotAuthenticated,

    /// The provider could not be reached.
    #[error("provider unreachable: {0}")]
    Network(String),

    /// Any other provider failure.
    #[error("provider error: {0}")]
    Other(String),
}

/// Errors reported by the user-info endpoint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserInfoError {
    /// The request could not be sent or completed.
    #[error("user request failed: {0}")]
    Request(String),

    /// The endpoint answered with a non-success status.
    #[error("user endpoint returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The response body could not be decoded.
    #[error("invalid user response: {0}")]
    InvalidBody(String),
}

/// Application-level errors of the auth scheme.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A credential was built without a provider session.
    #[error("provider session is required")]
    MissingSession,

    /// The refresh credential has expired; the session cannot be renewed.
    #[error("refresh token has expired")]
    ExpiredAuthSession,

    /// A domain rule was violated, e.g. a malformed structured token.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The identity provider failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The user-info endpoint failed.
    #[error(transparent)]
    UserInfo(#[from] UserInfoError),
}

/// Result type alias for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;
