//! Redis ORM demo - counts visits per identifier
//!
//! Usage: `redis_orm <identifier> [field]`

use std::env;

use anyhow::{bail, Context};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use redis_orm::config::ConfiguredStore;
use redis_orm::{attributes, spawn_cleanup_task, Config, Mapper, RecordConfig};

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the configured store (Redis or in-memory)
/// 4. Find or create the visit record and bump its counter
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "redis_orm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = env::args().skip(1);
    let Some(identifier) = args.next() else {
        bail!("usage: redis_orm <identifier> [field]");
    };
    let field = args.next().unwrap_or_else(|| "visits".to_string());

    let config = Config::from_env();
    info!(
        "Configuration loaded: redis={}, namespace={}, expiry={}s",
        config.redis_url.as_deref().unwrap_or("<memory>"),
        config.namespace,
        config.default_expiry
    );

    let store = config.open_store().context("opening backing store")?;
    let cleanup_handle = match &store {
        ConfiguredStore::Memory(memory) => {
            Some(spawn_cleanup_task(memory.clone(), config.cleanup_interval))
        }
        ConfiguredStore::Redis(_) => None,
    };

    let visits = Mapper::new(
        store.backing(),
        RecordConfig::new("visit")
            .with_namespace(config.namespace.clone())
            .with_cast(field.clone(), "int")
            .with_expiry(config.default_expiry),
    )?;

    // Record operations block on the store
    let (key, count, ttl) = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let mut record = visits.find_or_create(&identifier, attributes([(field.as_str(), 0)]))?;
        let count = record.incr_by(&field, 1)?;
        Ok((record.redis_key(), count, record.expires_in()?))
    })
    .await??;

    info!("{} -> {:?} (ttl {})", key, count, ttl);

    if let Some(handle) = cleanup_handle {
        handle.abort();
    }
    Ok(())
}
