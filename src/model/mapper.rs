//! Record Mapper
//!
//! Binds a record type's configuration to a backing store and an identifier
//! generator, and provides the type-level operations: construct, create,
//! find and find-or-create.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::identifier::{IdGenerator, UuidV4Generator};
use crate::model::config::format_key;
use crate::model::{AttributeValue, Attributes, Record, RecordConfig, OBJECT_IDENTIFIER_FIELD};
use crate::store::BackingStore;

// == Mapper ==
/// Handle for one record type. Cheap to clone.
#[derive(Clone)]
pub struct Mapper {
    pub(crate) config: Arc<RecordConfig>,
    pub(crate) store: Arc<dyn BackingStore>,
    pub(crate) ids: Arc<dyn IdGenerator>,
}

impl Mapper {
    // == Constructor ==
    /// Creates a mapper generating random UUID v4 identifiers.
    ///
    /// # Arguments
    /// * `store` - Backing store records are persisted into
    /// * `config` - The record type's configuration
    pub fn new(store: Arc<dyn BackingStore>, config: RecordConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            store,
            ids: Arc::new(UuidV4Generator),
        })
    }

    /// Replaces the identifier generator.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn config(&self) -> &RecordConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn BackingStore> {
        &self.store
    }

    /// Store key of the saved record with `identifier`.
    pub fn redis_key_for(&self, identifier: &str) -> String {
        format_key(self.config.namespace(), self.config.key(), true, Some(identifier))
    }

    // == New Record ==
    /// Builds an unsaved record. An `object_identifier` attribute is taken as
    /// the record's identifier and marks it saved; it is not kept as an attribute.
    pub fn new_record(&self, attributes: Attributes) -> Record {
        Record::new(self.clone(), attributes)
    }

    // == Create ==
    /// Builds a record and saves it.
    ///
    /// # Arguments
    /// * `attributes` - Initial attributes
    /// * `key` - Caller-chosen identifier; a generated one is used if None
    pub fn create(&self, mut attributes: Attributes, key: Option<&str>) -> Result<Record> {
        if let Some(key) = key {
            attributes.insert(
                OBJECT_IDENTIFIER_FIELD.to_string(),
                AttributeValue::from(key),
            );
        }

        let mut record = self.new_record(attributes);
        record.save()?;
        info!(key = %record.redis_key(), "Created record");
        Ok(record)
    }

    // == Find ==
    /// Loads the record saved under `identifier`, or None if there is none.
    pub fn find(&self, identifier: &str) -> Result<Option<Record>> {
        let redis_key = self.redis_key_for(identifier);

        if !self.store.exists(&redis_key)? {
            debug!(key = %redis_key, "Record not found");
            return Ok(None);
        }

        let mut attributes: Attributes = self
            .store
            .hgetall(&redis_key)?
            .into_iter()
            .map(|(field, value)| (field, AttributeValue::String(value)))
            .collect();
        attributes.insert(
            OBJECT_IDENTIFIER_FIELD.to_string(),
            AttributeValue::from(identifier),
        );

        Ok(Some(self.new_record(attributes)))
    }

    // == Find Or Create ==
    /// Loads the record saved under `identifier`, creating it from
    /// `attributes` if it does not exist. An existing record is returned
    /// unchanged and `attributes` is discarded.
    pub fn find_or_create(&self, identifier: &str, attributes: Attributes) -> Result<Record> {
        match self.find(identifier)? {
            Some(record) => Ok(record),
            None => self.create(attributes, Some(identifier)),
        }
    }

    // == Delete ==
    /// Removes the record saved under `identifier`. Returns true if it existed.
    pub fn delete(&self, identifier: &str) -> Result<bool> {
        self.store.del(&self.redis_key_for(identifier))
    }
}

impl fmt::Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
