//! SQL AST, its construction helpers and its rendering into parameterized SQL strings.

pub mod sql;
