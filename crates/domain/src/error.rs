//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur while interpreting credentials.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The token is structured but its expiry claim cannot be turned into a timestamp.
    #[error("malformed structured token: {0}")]
    MalformedStructuredToken(String),

    /// A configuration value is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
