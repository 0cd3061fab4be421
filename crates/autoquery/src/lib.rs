//! Query tables by describing what to query: declared fields and naming conventions are
//! translated into parameterized SQL, executed, and returned with totals and aggregates.

pub mod engine;
pub mod error;
pub mod registry;
pub mod state;

pub use engine::AutoQuery;
pub use error::QueryError;
pub use registry::{FilterTarget, Registry, ResponseContext};

pub use query_engine_execution::response::{Meta, QueryResponse};
pub use query_engine_translation::translation::query::{
    AggregateCommand, ConstructedQuery, QueryRequest,
};
