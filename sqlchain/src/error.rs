//! Error types for sqlchain

use thiserror::Error;

/// The main error type for sqlchain operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database connection or execution error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The statement was rendered without a table
    #[error("table name cannot be empty")]
    MissingTableName,

    /// UPDATE or DELETE without any usable WHERE predicate
    #[error("where condition cannot be empty")]
    MissingWhereClause,

    /// Argument is neither a record nor a key-value mapping, or a batch mixes shapes
    #[error("parameter error: {message}")]
    InvalidParameterShape { message: String },

    /// A single-row fetch returned nothing
    #[error("no data was queried")]
    NoRowsFound,

    /// Operator outside the supported whitelist
    #[error("unsupported operator '{operator}'")]
    UnsupportedOperator { operator: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A result column could not be decoded
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// The session was closed and can no longer execute statements
    #[error("session is closed")]
    SessionClosed,
}

/// Convenience Result type for sqlchain operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new invalid parameter shape error
    pub fn invalid_shape(message: impl Into<String>) -> Self {
        Self::InvalidParameterShape {
            message: message.into(),
        }
    }

    /// Create a new unsupported operator error
    pub fn unsupported_operator(operator: impl Into<String>) -> Self {
        Self::UnsupportedOperator {
            operator: operator.into(),
        }
    }

    /// Create a new column decode error
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn is_missing_where(&self) -> bool {
        matches!(self, Self::MissingWhereClause)
    }

    pub fn is_no_rows(&self) -> bool {
        matches!(self, Self::NoRowsFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_shape_error() {
        let err = Error::invalid_shape("expected a record or a mapping");
        assert!(matches!(err, Error::InvalidParameterShape { .. }));
        assert_eq!(
            err.to_string(),
            "parameter error: expected a record or a mapping"
        );
    }

    #[test]
    fn test_unsupported_operator_error() {
        let err = Error::unsupported_operator("between");
        assert!(matches!(err, Error::UnsupportedOperator { .. }));
        assert_eq!(err.to_string(), "unsupported operator 'between'");
    }

    #[test]
    fn test_decode_error() {
        let err = Error::decode("created_at", "unexpected type");
        assert_eq!(
            err.to_string(),
            "Decode error on column 'created_at': unexpected type"
        );
    }

    #[test]
    fn test_predicates() {
        assert!(Error::MissingWhereClause.is_missing_where());
        assert!(!Error::MissingTableName.is_missing_where());
        assert!(Error::NoRowsFound.is_no_rows());
        assert_eq!(Error::MissingTableName.to_string(), "table name cannot be empty");
    }
}
