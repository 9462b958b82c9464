//! User-info endpoint port

use async_trait::async_trait;
use sessionkit_domain::Endpoint;

use crate::error::UserInfoError;

/// Client for the configured user-info endpoint.
///
/// Implementations are expected to send the current authorization header.
#[async_trait]
pub trait UserInfoClient: Send + Sync {
    /// Requests `endpoint` and returns the decoded JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the endpoint answers with a
    /// non-success status, or the body is not JSON.
    async fn fetch(&self, endpoint: &Endpoint) -> Result<serde_json::Value, UserInfoError>;
}
