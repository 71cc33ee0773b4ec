//! Redis Store Module
//!
//! Backing store over a blocking Redis connection. Every command failure is
//! reported as `OrmError::Store` naming the command; nothing is retried.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use redis::{Client, Connection};
use tracing::{debug, info};

use crate::error::{OrmError, Result};
use crate::store::BackingStore;

// == Redis Store ==
/// Redis-backed store sharing one connection behind a mutex.
pub struct RedisStore {
    conn: Mutex<Connection>,
}

impl RedisStore {
    // == Constructor ==
    /// Connects to Redis.
    ///
    /// # Arguments
    /// * `url` - Redis connection URL (e.g. "redis://localhost:6379")
    pub fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url)
            .map_err(|e| OrmError::InvalidConfig(format!("bad Redis URL {}: {}", url, e)))?;
        let conn = client
            .get_connection()
            .map_err(|e| OrmError::Store(format!("Redis connect failed: {}", e)))?;

        info!("Connected to Redis at {}", url);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| OrmError::Store("Redis connection lock poisoned".to_string()))
    }

    fn query<T: redis::FromRedisValue>(&self, name: &str, cmd: &redis::Cmd) -> Result<T> {
        let mut conn = self.conn()?;
        debug!(command = name, "Redis round trip");
        cmd.query(&mut *conn)
            .map_err(|e| OrmError::Store(format!("Redis {} failed: {}", name, e)))
    }
}

impl BackingStore for RedisStore {
    fn exists(&self, key: &str) -> Result<bool> {
        let found: i64 = self.query("EXISTS", redis::cmd("EXISTS").arg(key))?;
        Ok(found > 0)
    }

    fn hgetall(&self, key: &str) -> Result<HashMap<String, String>> {
        self.query("HGETALL", redis::cmd("HGETALL").arg(key))
    }

    fn hset_all(&self, key: &str, fields: &[(String, String)]) -> Result<()> {
        // HSET refuses an empty field list
        if fields.is_empty() {
            return Ok(());
        }

        let mut cmd = redis::cmd("HSET");
        cmd.arg(key);
        for (field, value) in fields {
            cmd.arg(field).arg(value);
        }
        let _: i64 = self.query("HSET", &cmd)?;
        Ok(())
    }

    fn hincr_by(&self, key: &str, field: &str, delta: i64) -> Result<i64> {
        self.query("HINCRBY", redis::cmd("HINCRBY").arg(key).arg(field).arg(delta))
    }

    fn expire(&self, key: &str, seconds: u64) -> Result<bool> {
        let applied: i64 = self.query("EXPIRE", redis::cmd("EXPIRE").arg(key).arg(seconds))?;
        Ok(applied == 1)
    }

    fn ttl(&self, key: &str) -> Result<i64> {
        self.query("TTL", redis::cmd("TTL").arg(key))
    }

    fn del(&self, key: &str) -> Result<bool> {
        let removed: i64 = self.query("DEL", redis::cmd("DEL").arg(key))?;
        Ok(removed > 0)
    }
}

// These need a live server: REDIS_URL=redis://127.0.0.1/ cargo test -- --ignored
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{TTL_NON_EXISTENT, TTL_NO_EXPIRY};

    fn connect() -> RedisStore {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string());
        RedisStore::connect(&url).unwrap()
    }

    #[test]
    fn test_connect_rejects_bad_url() {
        let result = RedisStore::connect("not a url");
        assert!(matches!(result, Err(OrmError::InvalidConfig(_))));
    }

    #[test]
    #[ignore]
    fn test_redis_hash_roundtrip() {
        let store = connect();
        store.del("redis_orm_test:hash").unwrap();

        store
            .hset_all(
                "redis_orm_test:hash",
                &[("a".to_string(), "1".to_string())],
            )
            .unwrap();
        assert!(store.exists("redis_orm_test:hash").unwrap());
        assert_eq!(store.hgetall("redis_orm_test:hash").unwrap()["a"], "1");
        assert_eq!(store.hincr_by("redis_orm_test:hash", "a", 4).unwrap(), 5);

        assert_eq!(store.ttl("redis_orm_test:hash").unwrap(), TTL_NO_EXPIRY);
        assert!(store.expire("redis_orm_test:hash", 30).unwrap());
        assert_eq!(store.ttl("redis_orm_test:hash").unwrap(), 30);

        assert!(store.del("redis_orm_test:hash").unwrap());
        assert_eq!(store.ttl("redis_orm_test:hash").unwrap(), TTL_NON_EXISTENT);
    }
}
