//! File-Backed Engine Module
//!
//! Cache engine with the same mapping semantics as the in-memory one,
//! plus synchronous persistence: the whole mapping is loaded from a
//! flat JSON file at construction and rewritten from scratch on every
//! mutation. Single-writer by assumption; no locking, no incremental
//! updates. TTL is enforced lazily only — a process restart would lose
//! scheduled callbacks anyway, so this engine never arms timers.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::{CacheBackend, CacheStats, ExpireCallback, Record};
use crate::error::{CacheError, Result};

// == Shared State ==
#[derive(Debug, Default)]
struct Shared {
    entries: HashMap<String, Record>,
    stats: CacheStats,
}

// == File Engine ==
/// File-backed cache engine.
///
/// Every mutating call blocks on a full rewrite of the backing file —
/// O(cache size) per mutation is this engine's documented scalability
/// ceiling. Concurrent writers across processes are not supported;
/// the last writer wins silently.
#[derive(Debug)]
pub struct FileEngine {
    path: PathBuf,
    shared: Arc<Mutex<Shared>>,
}

impl FileEngine {
    // == Constructor ==
    /// Opens the engine over a backing file.
    ///
    /// If the file exists it must be both readable and writable
    /// ([`CacheError::Permission`] otherwise) and its contents are
    /// decoded as the persisted mapping. A corrupt or unparsable file
    /// is deliberately treated as an empty cache — the content is
    /// discarded on the next write rather than surfaced as an error.
    /// If the file does not exist, it is created holding an empty
    /// encoded mapping.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = Self::load(&path)?;
        info!(path = %path.display(), entries = entries.len(), "file cache opened");

        Ok(Self {
            path,
            shared: Arc::new(Mutex::new(Shared {
                entries,
                stats: CacheStats::new(),
            })),
        })
    }

    // == Load ==
    /// Reads the full mapping from disk, creating the file if missing.
    fn load(path: &Path) -> Result<HashMap<String, Record>> {
        if !path.exists() {
            let entries = HashMap::new();
            Self::save(path, &entries)?;
            return Ok(entries);
        }

        // The file must be usable for both the load and later rewrites
        OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| CacheError::Permission {
                path: path.to_path_buf(),
                source,
            })?;

        let data = fs::read_to_string(path).map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(serde_json::from_str(&data).unwrap_or_else(|err| {
            warn!(
                path = %path.display(),
                error = %err,
                "backing file is unparsable, starting with an empty cache"
            );
            HashMap::new()
        }))
    }

    // == Save ==
    /// Rewrites the whole mapping to disk.
    ///
    /// The write goes to a sibling temp file which is then renamed over
    /// the target, so a failure mid-write cannot truncate the previous
    /// contents. Blocking I/O on the calling context is this engine's
    /// contract.
    fn save(path: &Path, entries: &HashMap<String, Record>) -> Result<()> {
        let encoded = serde_json::to_string(entries)?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, encoded).map_err(|source| CacheError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, path).map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CacheBackend for FileEngine {
    async fn set(
        &self,
        key: &str,
        value: Value,
        ttl_ms: Option<u64>,
        _on_expire: Option<ExpireCallback>,
    ) -> Result<Value> {
        if ttl_ms == Some(0) {
            return Err(CacheError::InvalidTimeout);
        }

        let stored = Record::to_stored(&value)?;

        let mut shared = self.shared.lock().await;
        shared
            .entries
            .insert(key.to_string(), Record::new(stored, ttl_ms));
        let count = shared.entries.len();
        shared.stats.set_total_entries(count);
        Self::save(&self.path, &shared.entries)?;

        Ok(value)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut shared = self.shared.lock().await;

        if let Some(record) = shared.entries.get(key) {
            if !record.is_expired() {
                let value = record.value.clone();
                shared.stats.record_hit();
                return Ok(Some(value));
            }

            // Lazy purge is a mutation here: the purged mapping goes
            // straight back to disk
            shared.entries.remove(key);
            shared.stats.record_expired();
            let count = shared.entries.len();
            shared.stats.set_total_entries(count);
            Self::save(&self.path, &shared.entries)?;
        }

        shared.stats.record_miss();
        Ok(None)
    }

    async fn has(&self, key: &str) -> bool {
        self.shared.lock().await.entries.contains_key(key)
    }

    async fn del(&self, key: &str) -> Result<bool> {
        let mut shared = self.shared.lock().await;

        // Unlike the in-memory engine, removal here is unconditional:
        // a present key is deleted regardless of its expiry state.
        if shared.entries.remove(key).is_none() {
            return Ok(false);
        }

        let count = shared.entries.len();
        shared.stats.set_total_entries(count);
        Self::save(&self.path, &shared.entries)?;
        Ok(true)
    }

    async fn keys(&self) -> Vec<String> {
        self.shared.lock().await.entries.keys().cloned().collect()
    }

    async fn values(&self) -> Vec<(String, Record)> {
        self.shared
            .lock()
            .await
            .entries
            .iter()
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect()
    }

    async fn size(&self) -> usize {
        self.shared.lock().await.entries.len()
    }

    async fn ttl(&self, key: &str) -> i64 {
        self.shared
            .lock()
            .await
            .entries
            .get(key)
            .map(Record::ttl_remaining_ms)
            .unwrap_or(0)
    }

    async fn flush_all(&self) -> Result<()> {
        let mut shared = self.shared.lock().await;

        shared.entries.clear();
        shared.stats.set_total_entries(0);
        fs::remove_file(&self.path).map_err(|source| CacheError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "file cache flushed, backing file removed");

        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        let shared = self.shared.lock().await;
        let mut stats = shared.stats.clone();
        stats.set_total_entries(shared.entries.len());
        stats
    }
}
