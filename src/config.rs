//! Configuration Module
//!
//! Handles loading process configuration from environment variables.

use std::env;
use std::sync::Arc;

use crate::error::Result;
use crate::store::{BackingStore, MemoryStore, RedisStore};

/// Process configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection URL; None selects the in-memory store
    pub redis_url: Option<String>,
    /// Namespace applied to the demo record types
    pub namespace: String,
    /// Interval in seconds between in-memory expiry sweeps
    pub cleanup_interval: u64,
    /// Lifetime in seconds of demo records, 0 = never expire
    pub default_expiry: u64,
}

/// Store chosen by [`Config::open_store`].
pub enum ConfiguredStore {
    Redis(Arc<RedisStore>),
    Memory(Arc<MemoryStore>),
}

impl ConfiguredStore {
    /// The store as a trait object, for handing to mappers.
    pub fn backing(&self) -> Arc<dyn BackingStore> {
        match self {
            ConfiguredStore::Redis(store) => store.clone(),
            ConfiguredStore::Memory(store) => store.clone(),
        }
    }
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_URL` - Redis connection URL (default: unset, in-memory store)
    /// - `ORM_NAMESPACE` - Key namespace (default: "demo")
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 1)
    /// - `DEFAULT_EXPIRY` - Record lifetime in seconds (default: 0)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            namespace: env::var("ORM_NAMESPACE").unwrap_or(defaults.namespace),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cleanup_interval),
            default_expiry: env::var("DEFAULT_EXPIRY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_expiry),
        }
    }

    /// Connects to Redis if a URL is configured, otherwise creates an
    /// in-memory store.
    pub fn open_store(&self) -> Result<ConfiguredStore> {
        match &self.redis_url {
            Some(url) => Ok(ConfiguredStore::Redis(Arc::new(RedisStore::connect(url)?))),
            None => Ok(ConfiguredStore::Memory(Arc::new(MemoryStore::new()))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: None,
            namespace: "demo".to_string(),
            cleanup_interval: 1,
            default_expiry: 0,
        }
    }
}
