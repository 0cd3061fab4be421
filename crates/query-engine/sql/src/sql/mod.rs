//! SQL constructs shared by the translation and execution phases.

pub mod ast;
pub mod convert;
pub mod execution_plan;
pub mod helpers;
pub mod string;
