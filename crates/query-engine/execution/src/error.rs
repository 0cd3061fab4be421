//! Errors raised while executing a query.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Query(#[from] QueryError),
    #[error("database error: {0}")]
    DB(#[from] sqlx::Error),
}

/// Failures of the query itself, rather than of the database.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("result rows lack the property '{property}' the reference '{reference}' is keyed by")]
    MissingKey { reference: String, property: String },
    #[error("column '{column}' holds a value of unsupported type '{type_name}'")]
    UnsupportedValue { column: String, type_name: String },
}
