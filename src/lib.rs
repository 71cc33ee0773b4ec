//! Redis ORM - A minimal object mapper over a key/value store
//!
//! Represents typed records as in-memory attribute bags, persists them as
//! hashes under generated keys, and casts stored text back into rich values
//! on read.

pub mod cast;
pub mod config;
pub mod error;
pub mod identifier;
pub mod model;
pub mod store;
pub mod tasks;

pub use cast::{CastKind, CastValue};
pub use config::Config;
pub use error::{OrmError, Result};
pub use identifier::{IdGenerator, SequentialIdGenerator, UuidV4Generator};
pub use model::{attributes, AttributeValue, Attributes, Mapper, Record, RecordConfig};
pub use store::{BackingStore, MemoryStore, RedisStore};
pub use tasks::spawn_cleanup_task;
