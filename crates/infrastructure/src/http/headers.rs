//! Authorization header shared by outgoing requests.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Request, Url};
use sessionkit_application::ports::{HeaderSink, RequestInterceptor};
use sessionkit_domain::{Endpoint, SchemeConfig};
use tracing::{debug, warn};

use super::HttpError;

/// Holds the current authorization header and the interceptor state.
///
/// The header is attached to every request passed through [`Self::apply`].
/// Once armed, [`Self::should_intercept`] tells callers which requests need a
/// validity check before being sent; the token endpoint never does.
#[derive(Debug)]
pub struct RequestHeaders {
    name: HeaderName,
    value: RwLock<Option<String>>,
    armed: AtomicBool,
    token_endpoint: RwLock<Option<Url>>,
}

impl RequestHeaders {
    /// Creates an empty header named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidHeaderName`] if `name` is not a valid header name.
    pub fn new(name: &str) -> Result<Self, HttpError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| HttpError::InvalidHeaderName(name.to_string()))?;

        Ok(Self {
            name,
            value: RwLock::new(None),
            armed: AtomicBool::new(false),
            token_endpoint: RwLock::new(None),
        })
    }

    /// Creates the header named by `token.name` of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidHeaderName`] if the configured name is invalid.
    pub fn from_config(config: &SchemeConfig) -> Result<Self, HttpError> {
        Self::new(&config.token.name)
    }

    /// The header name.
    #[must_use]
    pub const fn name(&self) -> &HeaderName {
        &self.name
    }

    /// The current header value.
    #[must_use]
    pub fn value(&self) -> Option<String> {
        self.value.read().clone()
    }

    /// Whether the interceptor has been initialized.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Whether a request to `url` must be checked by the scheme before sending.
    #[must_use]
    pub fn should_intercept(&self, url: &Url) -> bool {
        if !self.is_armed() {
            return false;
        }

        !self
            .token_endpoint
            .read()
            .as_ref()
            .is_some_and(|endpoint| endpoint.origin() == url.origin() && endpoint.path() == url.path())
    }

    /// Attaches the current header to `request`, replacing any previous value.
    #[must_use]
    pub fn apply(&self, mut request: Request) -> Request {
        let Some(value) = self.value() else {
            request.headers_mut().remove(&self.name);
            return request;
        };

        match HeaderValue::from_str(&value) {
            Ok(mut header) => {
                header.set_sensitive(true);
                request.headers_mut().insert(self.name.clone(), header);
            }
            Err(_) => warn!(header = %self.name, "token is not a valid header value, request sent without it"),
        }

        request
    }
}

impl HeaderSink for RequestHeaders {
    fn set_header(&self, value: &str) {
        *self.value.write() = Some(value.to_string());
    }

    fn clear_header(&self) {
        *self.value.write() = None;
    }
}

impl RequestInterceptor for RequestHeaders {
    fn initialize(&self, token_endpoint: Option<&Endpoint>) {
        let endpoint = token_endpoint.and_then(|endpoint| match Url::parse(&endpoint.url) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(url = %endpoint.url, error = %e, "ignoring unparsable token endpoint");
                None
            }
        });

        *self.token_endpoint.write() = endpoint;
        self.armed.store(true, Ordering::Release);
        debug!(header = %self.name, "request interceptor armed");
    }
}
