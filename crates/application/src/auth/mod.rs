//! Session credentials and the auth scheme controller.
//!
//! This module provides:
//! - Access and refresh credential lifecycles with persisted expirations
//! - Provider item storage over the universal store
//! - The [`AuthScheme`] controller driving login, refresh and logout

mod expiration;
mod provider_storage;
mod refresh_token;
mod scheme;
mod token;

#[cfg(test)]
pub(crate) mod test_support;

pub use expiration::TokenContext;
pub use provider_storage::ProviderStorage;
pub use refresh_token::RefreshToken;
pub use scheme::{AuthScheme, AuthSchemeBuilder, ErrorContext, ErrorHandler, SchemeState};
pub use token::AccessToken;
