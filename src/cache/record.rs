//! Cache Record Module
//!
//! Defines the stored unit: a serialized value plus an optional
//! absolute expiration instant. The serde shape of this struct is also
//! the persisted file shape used by the file-backed engine.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

// == Cache Record ==
/// Represents a single cache record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// The stored value, always a string
    pub value: String,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    #[serde(rename = "expire", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl Record {
    // == Constructor ==
    /// Creates a new record with optional TTL.
    ///
    /// # Arguments
    /// * `value` - The already-serialized value to store
    /// * `ttl_ms` - Optional TTL in milliseconds, resolved against the current time
    pub fn new(value: String, ttl_ms: Option<u64>) -> Self {
        let expires_at = ttl_ms.map(|ttl| current_timestamp_ms().saturating_add(ttl));

        Self { value, expires_at }
    }

    // == To Stored ==
    /// Converts a caller value into its stored string form.
    ///
    /// Strings pass through unchanged; everything else is JSON-encoded.
    /// This is a one-way transform — `get` always returns the stored
    /// string, never the original value.
    pub fn to_stored(value: &Value) -> Result<String> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Ok(serde_json::to_string(other)?),
        }
    }

    // == Is Expired ==
    /// Checks if the record has expired.
    ///
    /// Boundary condition: a record is considered expired when the current
    /// time is greater than or equal to the expiration time.
    ///
    /// # Returns
    /// - `true` if the record has an expiry and the current time >= expiration time
    /// - `false` if the record has no expiry (never expires) or the TTL hasn't elapsed
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining TTL in milliseconds, or 0 if no expiry is set.
    ///
    /// The result is negative for a record whose expiry instant has already
    /// passed but which has not been purged yet.
    pub fn ttl_remaining_ms(&self) -> i64 {
        match self.expires_at {
            Some(expires) => expires as i64 - current_timestamp_ms() as i64,
            None => 0,
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
