//! Configuration Module
//!
//! Handles engine selection options, loadable from environment variables.

use std::env;
use std::path::PathBuf;

/// Engine selection options.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, Default)]
pub struct CacheOptions {
    /// Whether the cache should persist to a backing file
    pub persistence: bool,
    /// Path of the backing file; `None` uses [`crate::provider::DEFAULT_DB_FILE`]
    pub db_path: Option<PathBuf>,
}

impl CacheOptions {
    /// Creates new CacheOptions by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_PERSISTENCE` - Enable the file-backed engine (default: false)
    /// - `CACHE_DB_PATH` - Backing file path (default: unset)
    pub fn from_env() -> Self {
        Self {
            persistence: env::var("CACHE_PERSISTENCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            db_path: env::var("CACHE_DB_PATH").ok().map(PathBuf::from),
        }
    }
}
