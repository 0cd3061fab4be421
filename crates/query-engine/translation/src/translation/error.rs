//! Errors for translation.

use query_engine_metadata::metadata::database::ScalarType;

/// A type for translation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Query descriptor '{0}' not found.")]
    DescriptorNotFound(String),
    #[error("Entity '{0}' not found.")]
    EntityNotFound(String),
    #[error("Projection '{0}' not found.")]
    ProjectionNotFound(String),
    #[error("Column '{column}' not found in '{entity}'.")]
    ColumnNotFound { entity: String, column: String },
    #[error("Entity '{0}' has no primary key.")]
    PrimaryKeyNotFound(String),
    #[error("Invalid value {value} for type '{expected}'.")]
    InvalidValue {
        value: serde_json::Value,
        expected: ScalarType,
    },
    #[error("Between on '{column}' requires exactly 2 values, got {found}.")]
    InvalidBetweenValue { column: String, found: usize },
    #[error("Expected a single value for '{column}', got {found}.")]
    ValueCountMismatch { column: String, found: usize },
    #[error("Invalid value '{value}' for parameter '{name}'.")]
    InvalidParameter { name: String, value: String },
    #[error("Raw SQL filters are disabled, cannot use parameter '{0}'.")]
    RawSqlFiltersDisabled(String),
    #[error("Invalid template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },
}

impl Error {
    /// Whether the error was caused by the request rather than by how the engine is configured.
    pub fn is_invalid_request(&self) -> bool {
        match self {
            Error::DescriptorNotFound(_)
            | Error::InvalidValue { .. }
            | Error::InvalidBetweenValue { .. }
            | Error::ValueCountMismatch { .. }
            | Error::InvalidParameter { .. }
            | Error::RawSqlFiltersDisabled(_) => true,
            Error::EntityNotFound(_)
            | Error::ProjectionNotFound(_)
            | Error::ColumnNotFound { .. }
            | Error::PrimaryKeyNotFound(_)
            | Error::InvalidTemplate { .. } => false,
        }
    }
}
