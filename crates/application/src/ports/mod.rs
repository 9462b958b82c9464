//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the token lifecycle and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod headers;
mod provider;
mod store;
mod user_info;

pub use clock::Clock;
pub use headers::{HeaderSink, RequestInterceptor};
pub use provider::{
    IdentityProvider, ProviderSession, ProviderUser, RefreshCallback, SessionStorage,
    SharedSession,
};
pub use store::ExpiryStore;
pub use user_info::UserInfoClient;
