//! Common functions used across test cases.

pub mod configuration;
pub mod engine;
