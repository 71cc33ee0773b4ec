//! Backing Store Module
//!
//! The key/value service records are persisted into. Records only ever talk
//! to the [`BackingStore`] trait; [`RedisStore`] is the production
//! implementation and [`MemoryStore`] mirrors its semantics in-process.

mod entry;
mod memory;
mod redis_store;
mod stats;

use std::collections::HashMap;

use crate::error::Result;

// Re-export public types
pub use redis_store::RedisStore;
pub use entry::HashEntry;
pub use memory::MemoryStore;
pub use stats::StoreStats;

// == Public Constants ==
/// TTL reply for a key that exists but never expires
pub const TTL_NO_EXPIRY: i64 = -1;

/// TTL reply for a key that does not exist
pub const TTL_NON_EXISTENT: i64 = -2;

// == Backing Store ==
/// Hash, counter and expiry primitives a record needs from its store.
///
/// All calls are blocking. Failures surface as `OrmError::Store` and are
/// never retried.
pub trait BackingStore: Send + Sync {
    /// Returns true if `key` holds a live entry.
    fn exists(&self, key: &str) -> Result<bool>;

    /// Reads every field of the hash at `key`. A missing key yields an empty map.
    fn hgetall(&self, key: &str) -> Result<HashMap<String, String>>;

    /// Writes `fields` into the hash at `key`, overwriting fields already
    /// present. Fields not named are left untouched and so is the key's TTL.
    fn hset_all(&self, key: &str, fields: &[(String, String)]) -> Result<()>;

    /// Atomically adds `delta` to an integer hash field and returns the new value.
    /// A missing field counts as zero.
    fn hincr_by(&self, key: &str, field: &str, delta: i64) -> Result<i64>;

    /// Sets a TTL on `key`. Returns false if the key does not exist.
    fn expire(&self, key: &str, seconds: u64) -> Result<bool>;

    /// Remaining TTL of `key` in seconds, or one of [`TTL_NO_EXPIRY`] and
    /// [`TTL_NON_EXISTENT`].
    fn ttl(&self, key: &str) -> Result<i64>;

    /// Removes `key`. Returns true if something was deleted.
    fn del(&self, key: &str) -> Result<bool>;
}
