//! Identifier Generator Module
//!
//! Produces the identifiers bound to records on their first save. Records
//! depend on the [`IdGenerator`] capability only, so the random default can
//! be swapped for a deterministic one.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Source of unique record identifiers.
pub trait IdGenerator: Send + Sync {
    /// Returns a new identifier.
    fn create(&self) -> String;
}

// == UUID v4 Generator ==
/// Random version-4 UUIDs in the 36 character hyphenated layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4Generator;

impl IdGenerator for UuidV4Generator {
    fn create(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

// == Sequential Generator ==
/// Deterministic identifiers counting up from 1, formatted like UUIDs
/// (`00000000-0000-0000-0000-000000000001`, ...).
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn create(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        Uuid::from_u128(u128::from(n)).to_string()
    }
}
