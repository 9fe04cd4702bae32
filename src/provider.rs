//! Provider Module
//!
//! Selects and constructs one of the two cache engines behind the
//! shared capability trait.

use std::path::PathBuf;

use tracing::info;

use crate::cache::{CacheBackend, FileEngine, MemoryEngine};
use crate::config::CacheOptions;
use crate::error::Result;

// == Public Constants ==
/// Backing file used when persistence is requested without an explicit
/// path, resolved relative to the process working directory.
pub const DEFAULT_DB_FILE: &str = "cache.json";

// == Provider ==
/// Builds a cache engine from the given options.
///
/// With `persistence` set, returns a [`FileEngine`] over `db_path`
/// (or [`DEFAULT_DB_FILE`]); otherwise a [`MemoryEngine`].
pub fn provider(options: &CacheOptions) -> Result<Box<dyn CacheBackend>> {
    if options.persistence {
        let path = options
            .db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE));
        Ok(Box::new(FileEngine::open(path)?))
    } else {
        info!("using in-memory cache engine");
        Ok(Box::new(MemoryEngine::new()))
    }
}
