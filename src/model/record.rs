//! Record Module
//!
//! An in-memory attribute bag mapped to one hash in the backing store.

use std::fmt;

use tracing::{debug, warn};

use crate::cast::CastValue;
use crate::error::Result;
use crate::model::config::format_key;
use crate::model::{AttributeValue, Attributes, Mapper, OBJECT_IDENTIFIER_FIELD};
use crate::store::{TTL_NON_EXISTENT, TTL_NO_EXPIRY};

// == Record ==
/// A record instance.
///
/// The identifier is bound on first save, or up front when the record was
/// loaded or created with a caller-chosen key, and never changes afterwards.
pub struct Record {
    mapper: Mapper,
    attributes: Attributes,
    object_identifier: Option<String>,
    saved: bool,
}

impl Record {
    // == Constructor ==
    pub(crate) fn new(mapper: Mapper, mut attributes: Attributes) -> Self {
        let (object_identifier, saved) = match attributes.remove(OBJECT_IDENTIFIER_FIELD) {
            Some(AttributeValue::Null) => (None, true),
            Some(id) => (Some(id.to_store_string()), true),
            None => (None, false),
        };

        Self {
            mapper,
            attributes,
            object_identifier,
            saved,
        }
    }

    // == Save ==
    /// Writes every attribute to the store, binding an identifier first if
    /// the record has none. Expiry is only armed when the key has no TTL
    /// yet, so repeated saves do not push the deadline back.
    pub fn save(&mut self) -> Result<()> {
        if self.object_identifier.as_deref().map_or(true, str::is_empty) {
            if self.has_static_key() {
                warn!(
                    key = self.mapper.config.key(),
                    "Static-key record saved without an identifier; generating one"
                );
            }
            self.object_identifier = Some(self.mapper.ids.create());
        }

        self.saved = true;

        let redis_key = self.redis_key();
        let fields: Vec<(String, String)> = self
            .attributes
            .iter()
            .map(|(field, value)| (field.clone(), value.to_store_string()))
            .collect();
        self.mapper.store.hset_all(&redis_key, &fields)?;
        debug!(key = %redis_key, fields = fields.len(), "Saved record");

        if self.should_set_expires()? {
            self.set_expires(self.expiry_ttl())?;
        }
        Ok(())
    }

    fn should_set_expires(&self) -> Result<bool> {
        if !self.will_expire() {
            return Ok(false);
        }
        let ttl = self.expires_in()?;
        Ok(ttl == TTL_NON_EXISTENT || ttl == TTL_NO_EXPIRY)
    }

    // == Set Expires ==
    /// Sets the key's TTL unconditionally.
    pub fn set_expires(&self, ttl_seconds: u64) -> Result<()> {
        let redis_key = self.redis_key();
        self.mapper.store.expire(&redis_key, ttl_seconds)?;
        debug!(key = %redis_key, ttl_seconds, "Set expiry");
        Ok(())
    }

    // == Counters ==
    /// Atomically adds `delta` to `field` in the store, mirrors the new
    /// value in memory and returns it through the field's cast.
    pub fn incr_by(&mut self, field: &str, delta: i64) -> Result<CastValue> {
        let updated = self
            .mapper
            .store
            .hincr_by(&self.redis_key(), field, delta)?;
        self.attributes
            .insert(field.to_string(), AttributeValue::Int(updated));
        self.get_attribute(field)
    }

    /// Subtracts the magnitude of `delta`, whatever its sign.
    pub fn decr_by(&mut self, field: &str, delta: i64) -> Result<CastValue> {
        self.incr_by(field, -delta.saturating_abs())
    }

    // == Attributes ==
    /// Reads `field`, applying its declared cast. Unknown fields read as null.
    pub fn get_attribute(&self, field: &str) -> Result<CastValue> {
        let raw = self
            .attributes
            .get(field)
            .cloned()
            .unwrap_or(AttributeValue::Null);

        match self.mapper.config.cast_kind(field) {
            Some(kind) => self.mapper.config.caster().cast(kind, &raw),
            None => Ok(CastValue::from(raw)),
        }
    }

    /// Overwrites `field` if the record already has it. Fields absent at
    /// construction are ignored.
    pub fn set_attribute(&mut self, field: &str, value: impl Into<AttributeValue>) {
        match self.attributes.get_mut(field) {
            Some(slot) => *slot = value.into(),
            None => debug!(field, "Ignoring write to undeclared attribute"),
        }
    }

    /// Raw value of `field`, before any cast.
    pub fn raw_attribute(&self, field: &str) -> Option<&AttributeValue> {
        self.attributes.get(field)
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    // == Accessors ==
    /// Current store key; gains the identifier suffix once saved.
    pub fn redis_key(&self) -> String {
        format_key(
            self.namespace(),
            self.key(),
            self.saved,
            self.object_identifier.as_deref(),
        )
    }

    pub fn namespace(&self) -> Option<&str> {
        self.mapper.config.namespace()
    }

    pub fn key(&self) -> &str {
        self.mapper.config.key()
    }

    pub fn object_identifier(&self) -> Option<&str> {
        self.object_identifier.as_deref()
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn has_static_key(&self) -> bool {
        self.mapper.config.has_static_key()
    }

    /// True if the type is configured to expire.
    pub fn will_expire(&self) -> bool {
        self.mapper.config.will_expire()
    }

    /// Configured lifetime in seconds.
    pub fn expiry_ttl(&self) -> u64 {
        self.mapper.config.expiry_ttl()
    }

    /// Live TTL of the key in the store, or [`TTL_NO_EXPIRY`] / [`TTL_NON_EXISTENT`].
    pub fn expires_in(&self) -> Result<i64> {
        self.mapper.store.ttl(&self.redis_key())
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("key", &self.redis_key())
            .field("saved", &self.saved)
            .field("attributes", &self.attributes)
            .finish()
    }
}
