//! The envelope a query's results are returned in.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::rows::Row;

/// Aggregate values by label.
pub type Meta = IndexMap<String, String>;

/// The results of a query.
///
/// `total` counts every row in the query's scope, not only the returned page.
/// `meta` is absent unless at least one aggregate produced a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub offset: u32,
    pub total: u64,
    pub results: Vec<Row>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

/// The text an aggregate value is reported as. Nulls are empty.
pub fn aggregate_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
