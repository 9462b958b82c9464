//! Outgoing request ports

use sessionkit_domain::Endpoint;

/// Receives the authorization header value for outgoing requests.
pub trait HeaderSink: Send + Sync {
    /// Sets the header to `value`.
    fn set_header(&self, value: &str);

    /// Removes the header.
    fn clear_header(&self);
}

/// Hook that lets the scheme intercept outgoing requests.
pub trait RequestInterceptor: Send + Sync {
    /// Starts intercepting requests. Requests to `token_endpoint` are exempt.
    fn initialize(&self, token_endpoint: Option<&Endpoint>);
}
