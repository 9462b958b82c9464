//! `SessionKit` Application - Token lifecycle and the auth scheme controller
//!
//! This crate contains the application layer of `SessionKit`:
//! the ports the controller depends on, credential lifecycles and the
//! [`AuthScheme`] orchestrating them against an identity provider.

pub mod auth;
pub mod error;
pub mod ports;

pub use auth::{
    AccessToken, AuthScheme, AuthSchemeBuilder, ErrorContext, ErrorHandler, ProviderStorage,
    RefreshToken, SchemeState, TokenContext,
};
pub use error::{AuthError, AuthResult, ProviderError, UserInfoError};
