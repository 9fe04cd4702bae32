//! Expiration Scheduler Module
//!
//! Tracks one cancelable eviction task per key. The scheduler owns only
//! the task handles; building and spawning the eviction future is the
//! engine's job, so a timer fire can never act on anything but the
//! record that scheduled it.

use std::collections::HashMap;

use tokio::task::JoinHandle;

// == Expiration Scheduler ==
/// Registry of armed per-key eviction tasks.
///
/// Cancellation is the only control: a handle can be armed, canceled, or
/// marked complete by its own fire path. There is no pause or resume.
#[derive(Debug, Default)]
pub struct ExpirationScheduler {
    /// Armed eviction task per key
    timers: HashMap<String, JoinHandle<()>>,
}

impl ExpirationScheduler {
    // == Constructor ==
    /// Creates a new scheduler with no armed timers.
    pub fn new() -> Self {
        Self {
            timers: HashMap::new(),
        }
    }

    // == Arm ==
    /// Registers an eviction task for a key.
    ///
    /// Any previously armed task for the same key is aborted first, so a
    /// superseded timer can never fire for a value that has been replaced.
    pub fn arm(&mut self, key: &str, handle: JoinHandle<()>) {
        if let Some(old) = self.timers.insert(key.to_string(), handle) {
            old.abort();
        }
    }

    // == Cancel ==
    /// Aborts and removes the armed task for a key.
    ///
    /// Returns true if a task was registered.
    pub fn cancel(&mut self, key: &str) -> bool {
        if let Some(handle) = self.timers.remove(key) {
            handle.abort();
            true
        } else {
            false
        }
    }

    // == Complete ==
    /// Removes a registration without aborting it.
    ///
    /// Called by the fire path from inside the task itself; aborting here
    /// would cancel the task before its callback runs.
    pub fn complete(&mut self, key: &str) {
        self.timers.remove(key);
    }

    // == Cancel All ==
    /// Aborts every armed task.
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }

    // == Length ==
    /// Returns the number of armed timers.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn sleeper(ms: u64) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        })
    }

    #[tokio::test]
    async fn test_arm_and_cancel() {
        let mut scheduler = ExpirationScheduler::new();

        scheduler.arm("key1", sleeper(10_000));
        assert_eq!(scheduler.len(), 1);

        assert!(scheduler.cancel("key1"));
        assert!(scheduler.is_empty());
        assert!(!scheduler.cancel("key1"));
    }

    #[tokio::test]
    async fn test_arm_aborts_superseded_task() {
        let mut scheduler = ExpirationScheduler::new();
        let fired = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&fired);
        scheduler.arm(
            "key1",
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                flag.store(true, Ordering::SeqCst);
            }),
        );

        // Re-arming the same key must abort the first task
        scheduler.arm("key1", sleeper(10_000));
        assert_eq!(scheduler.len(), 1);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(!fired.load(Ordering::SeqCst), "superseded task must not fire");
    }

    #[tokio::test]
    async fn test_cancel_aborts_task() {
        let mut scheduler = ExpirationScheduler::new();
        let fired = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&fired);
        scheduler.arm(
            "key1",
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                flag.store(true, Ordering::SeqCst);
            }),
        );
        scheduler.cancel("key1");

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(!fired.load(Ordering::SeqCst), "canceled task must not fire");
    }

    #[tokio::test]
    async fn test_cancel_all() {
        let mut scheduler = ExpirationScheduler::new();

        scheduler.arm("key1", sleeper(10_000));
        scheduler.arm("key2", sleeper(10_000));
        scheduler.arm("key3", sleeper(10_000));
        assert_eq!(scheduler.len(), 3);

        scheduler.cancel_all();
        assert!(scheduler.is_empty());
    }

    #[tokio::test]
    async fn test_complete_removes_without_abort() {
        let mut scheduler = ExpirationScheduler::new();

        scheduler.arm("key1", sleeper(1));
        scheduler.complete("key1");
        assert!(scheduler.is_empty());
    }
}
