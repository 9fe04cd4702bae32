//! Cache Backend Trait
//!
//! The capability surface shared by both engines, so the provider can
//! swap backends transparently.

use async_trait::async_trait;
use serde_json::Value;

use crate::cache::{CacheStats, Record};
use crate::error::Result;

/// Callback invoked after a timer-driven eviction removes an entry.
///
/// Receives the evicted key and the original, pre-serialization value as
/// captured at schedule time. Only the in-memory engine ever invokes it.
pub type ExpireCallback = Box<dyn FnOnce(String, Value) + Send + 'static>;

// == Cache Backend ==
/// Operations common to the in-memory and file-backed engines.
#[async_trait]
pub trait CacheBackend: Send + Sync + 'static {
    /// Stores a value under a key, replacing any prior record.
    ///
    /// Non-string values are JSON-encoded before storage; the original
    /// value is echoed back. A supplied `ttl_ms` must be positive or the
    /// call fails with [`crate::CacheError::InvalidTimeout`]. On the
    /// in-memory engine a TTL arms a one-shot eviction timer, invoking
    /// `on_expire` after removal; the file-backed engine enforces TTL
    /// lazily and ignores `on_expire`.
    async fn set(
        &self,
        key: &str,
        value: Value,
        ttl_ms: Option<u64>,
        on_expire: Option<ExpireCallback>,
    ) -> Result<Value>;

    /// Returns the stored string for a key, or `None` if absent or expired.
    ///
    /// An expired entry is purged on the way out (lazy expiry). On the
    /// file-backed engine the purge rewrites the backing file, so a write
    /// failure surfaces here.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Returns true iff the key is present in the mapping.
    ///
    /// Expiry state is ignored and no purge is triggered.
    async fn has(&self, key: &str) -> bool;

    /// Removes a key, returning whether an entry was deleted.
    ///
    /// Known inconsistency between the engines: the in-memory engine
    /// refuses to delete an entry whose expiry instant has already passed
    /// (returns false, leaving it for lazy purge or its timer), while the
    /// file-backed engine removes a present key unconditionally.
    async fn del(&self, key: &str) -> Result<bool>;

    /// Returns all keys in the mapping, including logically expired but
    /// not yet purged entries.
    async fn keys(&self) -> Vec<String>;

    /// Returns a snapshot of all entries.
    ///
    /// Timer handles live in the scheduler, not in the records, so the
    /// snapshot carries plain data only.
    async fn values(&self) -> Vec<(String, Record)>;

    /// Returns the number of entries in the mapping.
    async fn size(&self) -> usize;

    /// Returns `expire - now` in milliseconds for a key with an expiry
    /// set, 0 otherwise (absent keys included). Negative for an
    /// expired-but-unpurged entry.
    async fn ttl(&self, key: &str) -> i64;

    /// Clears all state.
    ///
    /// The in-memory engine cancels every outstanding eviction timer; the
    /// file-backed engine also deletes the backing file from disk.
    async fn flush_all(&self) -> Result<()>;

    /// Returns current cache statistics.
    async fn stats(&self) -> CacheStats;
}
