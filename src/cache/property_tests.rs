//! Property-Based Tests for the Cache Engines
//!
//! Uses proptest to verify the behavioral properties of the in-memory
//! engine over arbitrary keys, values, and operation sequences.

use proptest::prelude::*;
use serde_json::{json, Value};
use tokio::runtime::Runtime;

use crate::cache::{CacheBackend, MemoryEngine};

// == Strategies ==
/// Generates valid cache keys (non-empty, word-like)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,64}".prop_map(|s| s)
}

/// Generates valid cache values
fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,256}".prop_map(|s| s)
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (valid_key_strategy(), valid_value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        valid_key_strategy().prop_map(|key| CacheOp::Get { key }),
        valid_key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("test runtime")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any valid key-value pair, storing the pair and then retrieving
    // it returns the exact string that was stored.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in valid_value_strategy()) {
        runtime().block_on(async {
            let engine = MemoryEngine::new();

            engine.set(&key, Value::String(value.clone()), None, None).await.unwrap();

            let retrieved = engine.get(&key).await.unwrap();
            prop_assert_eq!(retrieved.as_deref(), Some(value.as_str()), "Round-trip value mismatch");
            Ok(())
        })?;
    }

    // For any non-string value, the stored form is its JSON encoding.
    #[test]
    fn prop_non_string_values_stored_as_json(key in valid_key_strategy(), n in any::<i64>()) {
        runtime().block_on(async {
            let engine = MemoryEngine::new();

            engine.set(&key, json!(n), None, None).await.unwrap();

            let retrieved = engine.get(&key).await.unwrap();
            prop_assert_eq!(retrieved, Some(n.to_string()), "Stored form should be JSON text");
            Ok(())
        })?;
    }

    // For any key that exists, after a delete a subsequent get returns absent.
    #[test]
    fn prop_delete_removes_entry(key in valid_key_strategy(), value in valid_value_strategy()) {
        runtime().block_on(async {
            let engine = MemoryEngine::new();

            engine.set(&key, Value::String(value), None, None).await.unwrap();
            prop_assert!(engine.get(&key).await.unwrap().is_some(), "Key should exist before delete");

            prop_assert!(engine.del(&key).await.unwrap(), "Unexpired entry should be deletable");
            prop_assert!(engine.get(&key).await.unwrap().is_none(), "Key should not exist after delete");
            Ok(())
        })?;
    }

    // For any key, storing V1 then V2 results in get returning V2.
    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in valid_value_strategy(),
        value2 in valid_value_strategy()
    ) {
        runtime().block_on(async {
            let engine = MemoryEngine::new();

            engine.set(&key, Value::String(value1), None, None).await.unwrap();
            engine.set(&key, Value::String(value2.clone()), None, None).await.unwrap();

            let retrieved = engine.get(&key).await.unwrap();
            prop_assert_eq!(retrieved.as_deref(), Some(value2.as_str()), "Overwrite should return new value");
            prop_assert_eq!(engine.size().await, 1, "Should have exactly one entry after overwrite");
            Ok(())
        })?;
    }

    // ttl() is 0 for any key stored without a TTL and for any absent key.
    #[test]
    fn prop_ttl_zero_without_expiry(key in valid_key_strategy(), value in valid_value_strategy()) {
        runtime().block_on(async {
            let engine = MemoryEngine::new();

            prop_assert_eq!(engine.ttl(&key).await, 0, "Absent key should report 0");

            engine.set(&key, Value::String(value), None, None).await.unwrap();
            prop_assert_eq!(engine.ttl(&key).await, 0, "Key without TTL should report 0");
            Ok(())
        })?;
    }

    // For any sequence of operations, the statistics reflect exactly the
    // hits and misses that occurred, and size matches keys().
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        runtime().block_on(async {
            let engine = MemoryEngine::new();
            let mut expected_hits: u64 = 0;
            let mut expected_misses: u64 = 0;

            for op in ops {
                match op {
                    CacheOp::Set { key, value } => {
                        engine.set(&key, Value::String(value), None, None).await.unwrap();
                    }
                    CacheOp::Get { key } => {
                        match engine.get(&key).await.unwrap() {
                            Some(_) => expected_hits += 1,
                            None => expected_misses += 1,
                        }
                    }
                    CacheOp::Delete { key } => {
                        let _ = engine.del(&key).await.unwrap();
                    }
                }
            }

            let stats = engine.stats().await;
            prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
            prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
            prop_assert_eq!(stats.total_entries, engine.size().await, "Total entries mismatch");
            prop_assert_eq!(engine.keys().await.len(), engine.size().await, "Keys/size mismatch");
            Ok(())
        })?;
    }
}
