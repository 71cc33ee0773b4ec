//! Attribute Caster Module
//!
//! Coerces raw attribute values into typed values according to a per-field
//! cast declaration. Casting happens on read only and never touches the
//! stored raw value. Null always casts to null.

mod date;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde_json::Value;

use crate::error::Result;
use crate::model::AttributeValue;

pub use date::as_date_time;

// == Cast Kind ==
/// A declared cast. Parsed case-insensitively from the declaration text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastKind {
    Int,
    Float,
    String,
    Bool,
    /// JSON decoded into a keyed object
    Object,
    /// JSON decoded into a list or map
    Array,
    /// JSON decoded into an ordered sequence
    Collection,
    DateTime,
    /// Epoch seconds of the parsed date
    Timestamp,
    /// Unrecognised declaration; the raw value passes through
    Other(String),
}

impl CastKind {
    pub fn parse(declared: &str) -> Self {
        let kind = declared.trim().to_lowercase();
        match kind.as_str() {
            "int" | "integer" => CastKind::Int,
            "real" | "float" | "double" => CastKind::Float,
            "string" => CastKind::String,
            "bool" | "boolean" => CastKind::Bool,
            "object" => CastKind::Object,
            "array" | "json" => CastKind::Array,
            "collection" => CastKind::Collection,
            "date" | "datetime" => CastKind::DateTime,
            "timestamp" => CastKind::Timestamp,
            _ => CastKind::Other(kind),
        }
    }
}

impl From<&str> for CastKind {
    fn from(declared: &str) -> Self {
        CastKind::parse(declared)
    }
}

// == Cast Value ==
/// An attribute value after casting.
#[derive(Debug, Clone, PartialEq)]
pub enum CastValue {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Json(Value),
    Collection(Vec<Value>),
    DateTime(DateTime<FixedOffset>),
}

impl CastValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CastValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CastValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CastValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CastValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CastValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            CastValue::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&[Value]> {
        match self {
            CastValue::Collection(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            CastValue::DateTime(dt) => Some(dt),
            _ => None,
        }
    }
}

impl From<AttributeValue> for CastValue {
    fn from(value: AttributeValue) -> Self {
        match value {
            AttributeValue::Null => CastValue::Null,
            AttributeValue::Int(i) => CastValue::Int(i),
            AttributeValue::Float(f) => CastValue::Float(f),
            AttributeValue::String(s) => CastValue::String(s),
            AttributeValue::DateTime(dt) => CastValue::DateTime(dt),
        }
    }
}

// == Caster ==
/// Applies casts. Epochs and zone-less date text are placed in `timezone`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caster {
    pub timezone: FixedOffset,
}

impl Default for Caster {
    fn default() -> Self {
        Self {
            timezone: Utc.fix(),
        }
    }
}

impl Caster {
    pub fn new(timezone: FixedOffset) -> Self {
        Self { timezone }
    }

    /// Casts `value` to `kind`. Only the date casts can fail.
    pub fn cast(&self, kind: &CastKind, value: &AttributeValue) -> Result<CastValue> {
        if value.is_null() {
            return Ok(CastValue::Null);
        }

        Ok(match kind {
            CastKind::Int => CastValue::Int(to_int(value)),
            CastKind::Float => CastValue::Float(to_float(value)),
            CastKind::String => CastValue::String(value.to_store_string()),
            CastKind::Bool => CastValue::Bool(to_bool(value)),
            CastKind::Object | CastKind::Array => CastValue::Json(from_json(value)),
            CastKind::Collection => CastValue::Collection(match from_json(value) {
                Value::Array(items) => items,
                Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
                Value::Null => Vec::new(),
                scalar => vec![scalar],
            }),
            CastKind::DateTime => CastValue::DateTime(as_date_time(value, &self.timezone)?),
            CastKind::Timestamp => {
                CastValue::Int(as_date_time(value, &self.timezone)?.timestamp())
            }
            CastKind::Other(_) => CastValue::from(value.clone()),
        })
    }
}

/// Casts with a UTC caster, parsing the declared kind.
///
/// ```
/// use redis_orm::cast::{cast, CastValue};
///
/// assert_eq!(cast("bool", 0).unwrap(), CastValue::Bool(false));
/// assert_eq!(cast("int", "5").unwrap(), CastValue::Int(5));
/// ```
pub fn cast(kind: &str, value: impl Into<AttributeValue>) -> Result<CastValue> {
    Caster::default().cast(&CastKind::parse(kind), &value.into())
}

fn to_int(value: &AttributeValue) -> i64 {
    match value {
        AttributeValue::Null => 0,
        AttributeValue::Int(i) => *i,
        AttributeValue::Float(f) => *f as i64,
        AttributeValue::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| date::numeric(trimmed).map(|f| f as i64))
                .unwrap_or(0)
        }
        AttributeValue::DateTime(dt) => dt.timestamp(),
    }
}

fn to_float(value: &AttributeValue) -> f64 {
    match value {
        AttributeValue::Null => 0.0,
        AttributeValue::Int(i) => *i as f64,
        AttributeValue::Float(f) => *f,
        AttributeValue::String(s) => date::numeric(s).unwrap_or(0.0),
        AttributeValue::DateTime(dt) => dt.timestamp() as f64,
    }
}

fn to_bool(value: &AttributeValue) -> bool {
    match value {
        AttributeValue::Null => false,
        AttributeValue::Int(i) => *i != 0,
        AttributeValue::Float(f) => *f != 0.0,
        AttributeValue::String(s) => !(s.is_empty() || s == "0"),
        AttributeValue::DateTime(_) => true,
    }
}

/// Invalid JSON decodes to null.
fn from_json(value: &AttributeValue) -> Value {
    serde_json::from_str(&value.to_store_string()).unwrap_or(Value::Null)
}
