//! Record Type Configuration
//!
//! Everything that distinguishes one record type from another: where its
//! keys live, how its fields are cast and whether it expires.

use std::collections::HashMap;

use chrono::FixedOffset;

use crate::cast::{CastKind, Caster};
use crate::error::{OrmError, Result};

// == Record Config ==
/// Per-type configuration, built with chained setters.
///
/// ```
/// use redis_orm::model::RecordConfig;
///
/// let sessions = RecordConfig::new("session")
///     .with_namespace("prod")
///     .with_cast("user_id", "int")
///     .with_cast("started_at", "datetime")
///     .with_expiry(1800);
/// assert!(sessions.will_expire());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordConfig {
    namespace: Option<String>,
    key: String,
    casts: HashMap<String, CastKind>,
    expiry_ttl: u64,
    has_static_key: bool,
    caster: Caster,
}

impl RecordConfig {
    // == Constructor ==
    /// Creates a configuration for records stored under `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Prefixes every key with `namespace:`. An empty namespace means none.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.namespace = (!namespace.is_empty()).then_some(namespace);
        self
    }

    /// Declares a cast for `field`, e.g. `"bool"` or `"datetime"`.
    pub fn with_cast(mut self, field: impl Into<String>, kind: impl Into<CastKind>) -> Self {
        self.casts.insert(field.into(), kind.into());
        self
    }

    /// Records expire `seconds` after their first save. Zero disables expiry.
    pub fn with_expiry(mut self, seconds: u64) -> Self {
        self.expiry_ttl = seconds;
        self
    }

    /// Marks the type as keyed by caller-supplied identifiers.
    pub fn with_static_key(mut self) -> Self {
        self.has_static_key = true;
        self
    }

    /// Zone used when casting epochs and zone-less date text. Defaults to UTC.
    pub fn with_timezone(mut self, timezone: FixedOffset) -> Self {
        self.caster = Caster::new(timezone);
        self
    }

    // == Validate ==
    /// Rejects configurations whose keys could collide with other types.
    pub fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(OrmError::InvalidConfig("record key must not be empty".to_string()));
        }
        if self.namespace.as_deref().is_some_and(|ns| ns.contains(':')) {
            return Err(OrmError::InvalidConfig(format!(
                "namespace {:?} must not contain ':'",
                self.namespace
            )));
        }
        Ok(())
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn casts(&self) -> &HashMap<String, CastKind> {
        &self.casts
    }

    /// Declared cast for `field`, if any.
    pub fn cast_kind(&self, field: &str) -> Option<&CastKind> {
        self.casts.get(field)
    }

    pub fn expiry_ttl(&self) -> u64 {
        self.expiry_ttl
    }

    pub fn will_expire(&self) -> bool {
        self.expiry_ttl > 0
    }

    pub fn has_static_key(&self) -> bool {
        self.has_static_key
    }

    pub fn caster(&self) -> &Caster {
        &self.caster
    }
}

// == Format Key ==
/// Builds the store key `[namespace:]key[.identifier]`.
///
/// The identifier is only appended once the record is saved.
pub fn format_key(
    namespace: Option<&str>,
    key: &str,
    saved: bool,
    identifier: Option<&str>,
) -> String {
    let key = match identifier {
        Some(id) if saved && !id.is_empty() => format!("{}.{}", key, id),
        _ => key.to_string(),
    };

    match namespace {
        Some(ns) if !ns.is_empty() => format!("{}:{}", ns, key),
        _ => key,
    }
}
