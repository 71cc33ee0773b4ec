//! Attribute Values
//!
//! Raw values held in a record's attribute bag, and their store-native text.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};

/// Layout date/time attributes are written to the store in.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A record's attribute bag.
pub type Attributes = HashMap<String, AttributeValue>;

// == Attribute Value ==
/// A raw attribute as held in memory before any cast is applied.
///
/// Equality compares store-native text, so `Int(7)` equals `String("7")`
/// and a record reloaded from the store equals the one that wrote it.
#[derive(Debug, Clone)]
pub enum AttributeValue {
    Null,
    Int(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<FixedOffset>),
}

impl AttributeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Text written to the store for this value. Null becomes the empty string.
    pub fn to_store_string(&self) -> String {
        match self {
            AttributeValue::Null => String::new(),
            AttributeValue::Int(i) => i.to_string(),
            AttributeValue::Float(f) => f.to_string(),
            AttributeValue::String(s) => s.clone(),
            AttributeValue::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttributeValue::String(a), AttributeValue::String(b)) => a == b,
            (AttributeValue::Int(a), AttributeValue::Int(b)) => a == b,
            _ => self.to_store_string() == other.to_store_string(),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_store_string())
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Int(i64::from(value))
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        AttributeValue::Int(i64::from(value))
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<DateTime<FixedOffset>> for AttributeValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        AttributeValue::DateTime(value)
    }
}

impl From<DateTime<Utc>> for AttributeValue {
    fn from(value: DateTime<Utc>) -> Self {
        AttributeValue::DateTime(value.fixed_offset())
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttributeValue::Null, Into::into)
    }
}

/// Builds an attribute bag from `(name, value)` pairs.
///
/// ```
/// use redis_orm::model::attributes;
///
/// let attrs = attributes([("name", "ada"), ("role", "admin")]);
/// assert_eq!(attrs.len(), 2);
/// ```
pub fn attributes<I, K, V>(pairs: I) -> Attributes
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<AttributeValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
