//! HTTP infrastructure.
//!
//! This module provides:
//! - The shared authorization header applied to outgoing requests
//! - A reqwest client for the user-info endpoint

mod headers;
mod user_info;

pub use headers::RequestHeaders;
pub use user_info::ReqwestUserInfoClient;

/// Errors raised while configuring HTTP adapters.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The configured header name is not a valid HTTP header name.
    #[error("invalid header name '{0}'")]
    InvalidHeaderName(String),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}
