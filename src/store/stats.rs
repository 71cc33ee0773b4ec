//! Store Statistics Module
//!
//! Counts keys and expirations seen by the in-memory store.

use serde::Serialize;

// == Store Stats ==
/// Tracks in-memory store occupancy.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreStats {
    /// Entries dropped because their TTL elapsed
    pub expired: u64,
    /// Current number of keys held
    pub total_keys: usize,
}

impl StoreStats {
    /// Creates a new StoreStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_expired(&mut self, count: usize) {
        self.expired += count as u64;
    }

    pub fn set_total_keys(&mut self, count: usize) {
        self.total_keys = count;
    }
}
