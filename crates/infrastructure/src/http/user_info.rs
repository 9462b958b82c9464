//! User-info endpoint client using reqwest.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Request, Url};
use sessionkit_application::UserInfoError;
use sessionkit_application::ports::UserInfoClient;
use sessionkit_domain::{Endpoint, EndpointMethod};
use tracing::debug;

use super::{HttpError, RequestHeaders};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`UserInfoClient`] that sends the scheme's authorization header.
pub struct ReqwestUserInfoClient {
    client: Client,
    headers: Arc<RequestHeaders>,
}

impl ReqwestUserInfoClient {
    /// Creates a client with a 30 second timeout and no redirects.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be built.
    pub fn new(headers: Arc<RequestHeaders>) -> Result<Self, HttpError> {
        let client = Client::builder()
            .user_agent(concat!("sessionkit/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| HttpError::Client(e.to_string()))?;

        Ok(Self::with_client(client, headers))
    }

    /// Creates a client around an existing reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, headers: Arc<RequestHeaders>) -> Self {
        Self { client, headers }
    }

    /// Builds the request for `endpoint` with the current authorization header.
    ///
    /// # Errors
    ///
    /// Returns [`UserInfoError::Request`] if the endpoint URL is invalid.
    pub fn build_request(&self, endpoint: &Endpoint) -> Result<Request, UserInfoError> {
        let url = Url::parse(&endpoint.url)
            .map_err(|e| UserInfoError::Request(format!("invalid URL '{}': {e}", endpoint.url)))?;

        let request = self
            .client
            .request(to_reqwest_method(endpoint.method), url)
            .header(reqwest::header::ACCEPT, "application/json")
            .build()
            .map_err(|e| UserInfoError::Request(e.to_string()))?;

        Ok(self.headers.apply(request))
    }
}

const fn to_reqwest_method(method: EndpointMethod) -> Method {
    match method {
        EndpointMethod::Get => Method::GET,
        EndpointMethod::Post => Method::POST,
    }
}

fn map_error(error: &reqwest::Error) -> UserInfoError {
    if error.is_decode() {
        return UserInfoError::InvalidBody(error.to_string());
    }
    UserInfoError::Request(error.to_string())
}

#[async_trait]
impl UserInfoClient for ReqwestUserInfoClient {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<serde_json::Value, UserInfoError> {
        let request = self.build_request(endpoint)?;
        debug!(method = %request.method(), url = %request.url(), "fetching user");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| map_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UserInfoError::Status {
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|e| map_error(&e))
    }
}

impl std::fmt::Debug for ReqwestUserInfoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestUserInfoClient")
            .field("header", self.headers.name())
            .finish_non_exhaustive()
    }
}
