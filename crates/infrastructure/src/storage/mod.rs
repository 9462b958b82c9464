//! Universal key/value storage.
//!
//! [`UniversalStorage`] keeps a process-local copy of every value and mirrors
//! writes to a [`StorageMedium`] that other contexts can read and write.

mod medium;
mod universal;

use std::path::PathBuf;

pub use medium::{JsonFileMedium, MemoryMedium, StorageMedium};
pub use universal::UniversalStorage;

/// Errors raised by a storage medium.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The medium file could not be read or written.
    #[error("storage file {path}: {source}")]
    Io {
        /// Medium file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The medium file does not hold a JSON object of stored values.
    #[error("storage file {path} is corrupt: {source}")]
    Corrupt {
        /// Medium file.
        path: PathBuf,
        /// Decoding error.
        #[source]
        source: serde_json::Error,
    },
}
