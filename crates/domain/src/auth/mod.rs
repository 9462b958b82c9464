//! Authentication domain types

mod jwt;
mod types;

pub use jwt::{TokenDecode, decode_expiry, resolve_expiration};
pub use types::{CheckResult, Expiration, LoginCredentials, StoredValue, TokenStatus};
