//! Model Module
//!
//! Typed records persisted as hashes: per-type configuration, the mapper
//! handle for type-level operations, and record instances.

mod attribute;
mod config;
mod mapper;
mod record;


// Re-export public types
pub use attribute::{attributes, AttributeValue, Attributes, DATETIME_FORMAT};
pub use config::{format_key, RecordConfig};
pub use mapper::Mapper;
pub use record::Record;

// == Public Constants ==
/// Attribute name that carries a known identifier into a new record.
/// It is consumed on construction and never persisted.
pub const OBJECT_IDENTIFIER_FIELD: &str = "object_identifier";
