//! Error types for the cache engines
//!
//! Provides unified error handling using thiserror.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for both cache engines.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A TTL was supplied to `set` but is not a positive number
    #[error("cache timeout must be a positive number")]
    InvalidTimeout,

    /// The backing file exists but is not both readable and writable
    #[error("cache file is not readable and writable: {path}")]
    Permission {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Filesystem failure while loading or rewriting the backing file
    #[error("cache file I/O failed: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A value or the persisted mapping could not be encoded
    #[error("cache encoding failed")]
    Encode(#[from] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the cache engines.
pub type Result<T> = std::result::Result<T, CacheError>;
