//! The errors a query can fail with, classified by who is at fault.

use thiserror::Error;

use query_engine_execution::error as execution;
use query_engine_translation::translation::error as translation;

#[derive(Debug, Error)]
pub enum QueryError {
    /// The request cannot be served as given: a value of the wrong type, an unknown
    /// descriptor, raw SQL while it is disabled.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// A registered descriptor refers to something that does not exist.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl From<translation::Error> for QueryError {
    fn from(error: translation::Error) -> Self {
        if error.is_invalid_request() {
            QueryError::InvalidRequest(error.to_string())
        } else {
            QueryError::Configuration(error.to_string())
        }
    }
}

impl From<execution::Error> for QueryError {
    fn from(error: execution::Error) -> Self {
        QueryError::Other(error.into())
    }
}

impl From<sqlx::Error> for QueryError {
    fn from(error: sqlx::Error) -> Self {
        QueryError::Other(error.into())
    }
}
