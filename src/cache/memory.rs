//! In-Memory Engine Module
//!
//! Cache engine owning the key→Record mapping with timer-driven and
//! lazy TTL eviction.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::{CacheBackend, CacheStats, ExpirationScheduler, ExpireCallback, Record};
use crate::error::{CacheError, Result};

// == Shared State ==
/// State behind the engine lock: the mapping, the per-key eviction
/// timers, and the counters. Each engine instance owns its own copy —
/// no ambient or global state.
#[derive(Debug, Default)]
struct Shared {
    entries: HashMap<String, Record>,
    scheduler: ExpirationScheduler,
    stats: CacheStats,
}

// == Memory Engine ==
/// In-memory cache engine with per-entry TTL eviction.
///
/// Eviction timers are tokio tasks; arming one therefore requires a
/// running tokio runtime. All other operations only need the runtime
/// to await the engine lock.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryEngine {
    // == Constructor ==
    /// Creates a new empty in-memory engine.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Spawns the one-shot eviction task for a key.
///
/// On fire: remove the key unconditionally (the guarded `del` does not
/// apply to timer evictions), drop this task's own scheduler
/// registration, then invoke the callback with the value captured at
/// schedule time. The callback runs after the lock is released so it
/// may reenter the cache.
fn spawn_eviction(
    shared: Arc<Mutex<Shared>>,
    key: String,
    original: Value,
    ttl_ms: u64,
    on_expire: Option<ExpireCallback>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(ttl_ms)).await;

        {
            let mut shared = shared.lock().await;
            // A lazy purge may have raced us here; count only a real removal
            if shared.entries.remove(&key).is_some() {
                shared.stats.record_expired();
                let count = shared.entries.len();
                shared.stats.set_total_entries(count);
            }
            shared.scheduler.complete(&key);
        }

        debug!(key = %key, "timer eviction fired");
        if let Some(callback) = on_expire {
            callback(key, original);
        }
    })
}

#[async_trait]
impl CacheBackend for MemoryEngine {
    async fn set(
        &self,
        key: &str,
        value: Value,
        ttl_ms: Option<u64>,
        on_expire: Option<ExpireCallback>,
    ) -> Result<Value> {
        if ttl_ms == Some(0) {
            return Err(CacheError::InvalidTimeout);
        }

        let stored = Record::to_stored(&value)?;

        let mut shared = self.shared.lock().await;

        // An overwritten record must never see its old timer fire
        shared.scheduler.cancel(key);

        if let Some(ttl) = ttl_ms {
            let handle = spawn_eviction(
                Arc::clone(&self.shared),
                key.to_string(),
                value.clone(),
                ttl,
                on_expire,
            );
            shared.scheduler.arm(key, handle);
        }

        shared
            .entries
            .insert(key.to_string(), Record::new(stored, ttl_ms));
        let count = shared.entries.len();
        shared.stats.set_total_entries(count);

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

            // Lazy purge. The timer registration is left alone: the task
            // fires at this same instant and cleans up after itself.
            shared.entries.remove(key);
            shared.stats.record_expired();
            let count = shared.entries.len();
            shared.stats.set_total_entries(count);
        }

        shared.stats.record_miss();
        Ok(None)
    }

    async fn has(&self, key: &str) -> bool {
        self.shared.lock().await.entries.contains_key(key)
    }

    async fn del(&self, key: &str) -> Result<bool> {
        let mut shared = self.shared.lock().await;

        let expired = match shared.entries.get(key) {
            Some(record) => record.is_expired(),
            None => return Ok(false),
        };

        shared.scheduler.cancel(key);

        // Guarded delete: a logically-expired-but-unpurged entry is not
        // deletable through this call and stays in place.
        if expired {
            return Ok(false);
        }

        shared.entries.remove(key);
        let count = shared.entries.len();
        shared.stats.set_total_entries(count);
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

        shared.scheduler.cancel_all();
        shared.entries.clear();
        shared.stats.set_total_entries(0);
        debug!("in-memory cache flushed");

        Ok(())
    }

    async fn stats(&self) -> CacheStats {
        let shared = self.shared.lock().await;
        let mut stats = shared.stats.clone();
        stats.set_total_entries(shared.entries.len());
        stats
    }
}
