//! SessionKit Domain - Core credential types
//!
//! This crate defines the credential model shared by the token lifecycle
//! and the auth scheme controller. All types here are pure Rust with no
//! I/O dependencies.

pub mod auth;
pub mod config;
pub mod error;
pub mod user;

pub use auth::{
    CheckResult, Expiration, LoginCredentials, StoredValue, TokenDecode, TokenStatus,
    decode_expiry, resolve_expiration,
};
pub use config::{
    CredentialSource, Endpoint, EndpointMethod, EndpointsConfig, ProviderCredentials,
    RefreshTokenConfig, SchemeConfig, TokenConfig, UserConfig,
};
pub use error::{DomainError, DomainResult};
pub use user::{UserProfile, merge_profile, provider_profile, response_property};
