//! Hash Entry Module
//!
//! A single hash held by the in-memory store, with optional expiry.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

// == Hash Entry ==
/// Field map stored under one key, plus its expiry deadline.
#[derive(Debug, Clone, Default)]
pub struct HashEntry {
    /// Field values, stored as text the way Redis stores them
    pub fields: HashMap<String, String>,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl HashEntry {
    // == Constructor ==
    /// Creates an empty entry that never expires.
    pub fn new() -> Self {
        Self::default()
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches its deadline.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(current_timestamp_ms()))
    }

    /// Returns remaining TTL in seconds, rounded to the nearest second like
    /// the Redis `TTL` command, or None if no expiration is set.
    pub fn ttl_remaining(&self) -> Option<u64> {
        self.ttl_remaining_ms().map(|ms| (ms + 500) / 1000)
    }
}

// == Deadline ==
/// Unix millisecond deadline `ttl_seconds` from now, or None when it does
/// not fit a signed 64-bit millisecond clock (Redis rejects those too).
pub fn deadline_after(ttl_seconds: u64) -> Option<u64> {
    ttl_seconds
        .checked_mul(1000)
        .and_then(|ms| ms.checked_add(current_timestamp_ms()))
        .filter(|deadline| *deadline <= i64::MAX as u64)
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
