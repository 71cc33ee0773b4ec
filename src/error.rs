//! Error types for the object mapper
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == ORM Error Enum ==
/// Unified error type for record persistence and attribute casting.
///
/// A missing record is not an error: `find` returns `Ok(None)`.
#[derive(Error, Debug)]
pub enum OrmError {
    /// The backing store rejected a command or could not be reached
    #[error("Backing store failure: {0}")]
    Store(String),

    /// A date cast received a value matching none of the accepted formats
    #[error("Malformed date: {0}")]
    MalformedDate(String),

    /// A record type or the process configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the object mapper.
pub type Result<T> = std::result::Result<T, OrmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = OrmError::MalformedDate("yesterday".to_string());
        assert_eq!(err.to_string(), "Malformed date: yesterday");

        let err = OrmError::Store("Redis HSET failed: broken pipe".to_string());
        assert!(err.to_string().starts_with("Backing store failure"));
    }
}
