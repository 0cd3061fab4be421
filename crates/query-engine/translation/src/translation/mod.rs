//! Translate an incoming QueryRequest to an ExecutionPlan (SQL) to be run against the database.

pub mod error;
pub mod helpers;
pub mod query;
