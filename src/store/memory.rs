//! Memory Store Module
//!
//! In-process backing store with Redis hash and TTL semantics. Used by the
//! test suites and by the demo binary when no Redis URL is configured.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use super::entry::deadline_after;
use crate::error::{OrmError, Result};
use crate::store::{BackingStore, HashEntry, StoreStats, TTL_NON_EXISTENT, TTL_NO_EXPIRY};

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, HashEntry>,
    stats: StoreStats,
}

impl Inner {
    /// Returns the live entry at `key`, dropping it first if it has expired.
    fn live(&mut self, key: &str) -> Option<&mut HashEntry> {
        if self.entries.get(key).is_some_and(HashEntry::is_expired) {
            self.entries.remove(key);
            self.stats.record_expired(1);
            self.stats.set_total_keys(self.entries.len());
        }
        self.entries.get_mut(key)
    }
}

// == Memory Store ==
/// Thread-safe map of hash entries with lazy expiry.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| OrmError::Store("memory store lock poisoned".to_string()))
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> Result<usize> {
        let mut inner = self.lock()?;
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired());

        let count = before - inner.entries.len();
        let total = inner.entries.len();
        inner.stats.record_expired(count);
        inner.stats.set_total_keys(total);
        Ok(count)
    }

    // == Stats ==
    /// Returns current store statistics.
    pub fn stats(&self) -> Result<StoreStats> {
        let inner = self.lock()?;
        let mut stats = inner.stats.clone();
        stats.set_total_keys(inner.entries.len());
        Ok(stats)
    }

    // == Length ==
    /// Returns the number of keys held, expired or not.
    pub fn len(&self) -> usize {
        self.lock().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BackingStore for MemoryStore {
    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.lock()?.live(key).is_some())
    }

    fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        let mut inner = self.lock()?;
        Ok(inner
            .live(key)
            .map(|entry| entry.fields.clone())
            .unwrap_or_default())
    }

    fn hset_all(&self, key: &str, fields: &[(String, String)]) -> Result<()> {
        // Redis never holds an empty hash
        if fields.is_empty() {
            return Ok(());
        }

        let mut inner = self.lock()?;
        if inner.live(key).is_none() {
            inner.entries.insert(key.to_string(), HashEntry::new());
        }
        if let Some(entry) = inner.entries.get_mut(key) {
            for (field, value) in fields {
                entry.fields.insert(field.clone(), value.clone());
            }
        }

        let total = inner.entries.len();
        inner.stats.set_total_keys(total);
        debug!(key, fields = fields.len(), "memory store HSET");
        Ok(())
    }

    fn hincr_by(&self, key: &str, field: &str, delta: i64) -> Result<i64> {
        let mut inner = self.lock()?;
        if inner.live(key).is_none() {
            inner.entries.insert(key.to_string(), HashEntry::new());
        }
        let entry = inner
            .entries
            .get_mut(key)
            .ok_or_else(|| OrmError::Store(format!("HINCRBY lost key {}", key)))?;

        let current = match entry.fields.get(field) {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| OrmError::Store("hash value is not an integer".to_string()))?,
            None => 0,
        };
        let updated = current
            .checked_add(delta)
            .ok_or_else(|| OrmError::Store("increment or decrement would overflow".to_string()))?;

        entry.fields.insert(field.to_string(), updated.to_string());
        let total = inner.entries.len();
        inner.stats.set_total_keys(total);
        Ok(updated)
    }

    fn expire(&self, key: &str, seconds: u64) -> Result<bool> {
        let deadline = deadline_after(seconds).ok_or_else(|| {
            OrmError::Store("invalid expire time in 'expire' command".to_string())
        })?;

        let mut inner = self.lock()?;
        if seconds == 0 {
            // EXPIRE with a non-positive timeout deletes the key
            let removed = inner.live(key).is_some();
            inner.entries.remove(key);
            return Ok(removed);
        }
        match inner.live(key) {
            Some(entry) => {
                entry.expires_at = Some(deadline);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn ttl(&self, key: &str) -> Result<i64> {
        let mut inner = self.lock()?;
        Ok(match inner.live(key) {
            Some(entry) => entry
                .ttl_remaining()
                .map(|secs| secs as i64)
                .unwrap_or(TTL_NO_EXPIRY),
            None => TTL_NON_EXISTENT,
        })
    }

    fn del(&self, key: &str) -> Result<bool> {
        let mut inner = self.lock()?;
        let removed = inner.live(key).is_some();
        inner.entries.remove(key);
        let total = inner.entries.len();
        inner.stats.set_total_keys(total);
        Ok(removed)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(f, v)| (f.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_store_new() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert!(!store.exists("missing").unwrap());
    }

    #[test]
    fn test_hset_and_hgetall() {
        let store = MemoryStore::new();
        store
            .hset_all("user.1", &fields(&[("name", "ada"), ("age", "36")]))
            .unwrap();

        let hash = store.hgetall("user.1").unwrap();
        assert_eq!(hash.len(), 2);
        assert_eq!(hash["name"], "ada");
        assert_eq!(hash["age"], "36");
        assert!(store.exists("user.1").unwrap());
    }

    #[test]
    fn test_hset_merges_fields() {
        let store = MemoryStore::new();
        store.hset_all("k", &fields(&[("a", "1"), ("b", "2")])).unwrap();
        store.hset_all("k", &fields(&[("b", "3")])).unwrap();

        let hash = store.hgetall("k").unwrap();
        assert_eq!(hash["a"], "1");
        assert_eq!(hash["b"], "3");
    }

    #[test]
    fn test_empty_hset_creates_nothing() {
        let store = MemoryStore::new();
        store.hset_all("k", &[]).unwrap();

        assert!(!store.exists("k").unwrap());
        assert_eq!(store.ttl("k").unwrap(), TTL_NON_EXISTENT);
    }

    #[test]
    fn test_hgetall_missing_is_empty() {
        let store = MemoryStore::new();
        assert!(store.hgetall("nothing").unwrap().is_empty());
        assert!(!store.exists("nothing").unwrap());
    }

    #[test]
    fn test_hincr_by() {
        let store = MemoryStore::new();
        assert_eq!(store.hincr_by("k", "count", 5).unwrap(), 5);
        assert_eq!(store.hincr_by("k", "count", -7).unwrap(), -2);
        assert_eq!(store.hgetall("k").unwrap()["count"], "-2");
    }

    #[test]
    fn test_hincr_by_rejects_text() {
        let store = MemoryStore::new();
        store.hset_all("k", &fields(&[("name", "ada")])).unwrap();

        let result = store.hincr_by("k", "name", 1);
        assert!(matches!(result, Err(OrmError::Store(_))));
    }

    #[test]
    fn test_hincr_by_overflow() {
        let store = MemoryStore::new();
        store
            .hset_all("k", &fields(&[("n", i64::MAX.to_string().as_str())]))
            .unwrap();

        assert!(store.hincr_by("k", "n", 1).is_err());
    }

    #[test]
    fn test_ttl_sentinels() {
        let store = MemoryStore::new();
        assert_eq!(store.ttl("k").unwrap(), TTL_NON_EXISTENT);

        store.hset_all("k", &fields(&[("a", "1")])).unwrap();
        assert_eq!(store.ttl("k").unwrap(), TTL_NO_EXPIRY);

        assert!(store.expire("k", 30).unwrap());
        assert_eq!(store.ttl("k").unwrap(), 30);
    }

    #[test]
    fn test_hset_keeps_ttl() {
        let store = MemoryStore::new();
        store.hset_all("k", &fields(&[("a", "1")])).unwrap();
        store.expire("k", 30).unwrap();
        store.hset_all("k", &fields(&[("a", "2")])).unwrap();

        assert_eq!(store.ttl("k").unwrap(), 30);
    }

    #[test]
    fn test_expire_missing_key() {
        let store = MemoryStore::new();
        assert!(!store.expire("k", 10).unwrap());
    }

    #[test]
    fn test_expire_out_of_range_is_rejected() {
        let store = MemoryStore::new();
        store.hset_all("k", &fields(&[("a", "1")])).unwrap();

        let result = store.expire("k", u64::MAX / 10);
        assert!(matches!(result, Err(OrmError::Store(msg)) if msg.contains("invalid expire time")));
        // the key keeps its previous lifetime
        assert_eq!(store.ttl("k").unwrap(), TTL_NO_EXPIRY);
    }

    #[test]
    fn test_expire_zero_deletes() {
        let store = MemoryStore::new();
        store.hset_all("k", &fields(&[("a", "1")])).unwrap();

        assert!(store.expire("k", 0).unwrap());
        assert!(!store.exists("k").unwrap());
    }

    #[test]
    fn test_lazy_expiry() {
        let store = MemoryStore::new();
        store.hset_all("k", &fields(&[("a", "1")])).unwrap();
        store.expire("k", 1).unwrap();

        sleep(Duration::from_millis(1100));

        assert!(!store.exists("k").unwrap());
        assert!(store.hgetall("k").unwrap().is_empty());
        assert_eq!(store.stats().unwrap().expired, 1);
    }

    #[test]
    fn test_cleanup_expired() {
        let store = MemoryStore::new();
        store.hset_all("short", &fields(&[("a", "1")])).unwrap();
        store.hset_all("long", &fields(&[("a", "1")])).unwrap();
        store.expire("short", 1).unwrap();
        store.expire("long", 10).unwrap();

        sleep(Duration::from_millis(1100));

        assert_eq!(store.cleanup_expired().unwrap(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.exists("long").unwrap());
    }

    #[test]
    fn test_del() {
        let store = MemoryStore::new();
        store.hset_all("k", &fields(&[("a", "1")])).unwrap();

        assert!(store.del("k").unwrap());
        assert!(!store.del("k").unwrap());
        assert!(store.is_empty());
    }
}
