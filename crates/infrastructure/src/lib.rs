//! `SessionKit` Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer: universal storage media, the
//! authorization header, the user-info HTTP client, the system clock and
//! the scheme options loader.

pub mod adapters;
pub mod config;
pub mod http;
pub mod storage;

pub use adapters::SystemClock;
pub use config::{ConfigError, ConfigFormat, load_scheme_config, parse_scheme_config};
pub use http::{HttpError, RequestHeaders, ReqwestUserInfoClient};
pub use storage::{JsonFileMedium, MemoryMedium, StorageError, StorageMedium, UniversalStorage};
