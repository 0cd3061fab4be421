use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Settings that shape how requests are translated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuerySettings {
    /// The most rows a single request may return. Also the limit applied when `take` is absent.
    #[serde(default = "max_limit_default")]
    pub max_limit: Option<u32>,
    /// Allow callers to pass raw SQL fragments.
    #[serde(default)]
    pub enable_raw_sql_filters: bool,
    #[serde(default)]
    pub raw_sql_filter_names: RawSqlFilterNames,
}

impl QuerySettings {
    pub fn is_default(&self) -> bool {
        *self == QuerySettings::default()
    }
}

impl Default for QuerySettings {
    fn default() -> Self {
        QuerySettings {
            max_limit: Some(100),
            enable_raw_sql_filters: false,
            raw_sql_filter_names: RawSqlFilterNames::default(),
        }
    }
}

fn max_limit_default() -> Option<u32> {
    QuerySettings::default().max_limit
}

/// The parameter names raw SQL fragments are passed under.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSqlFilterNames {
    pub r#where: String,
    pub select: String,
    pub from: String,
    pub join: String,
    pub order_by: String,
}

impl RawSqlFilterNames {
    /// Is the parameter name one of the raw SQL fragments, ignoring case.
    pub fn contains(&self, name: &str) -> bool {
        [
            &self.r#where,
            &self.select,
            &self.from,
            &self.join,
            &self.order_by,
        ]
        .into_iter()
        .any(|raw| raw.eq_ignore_ascii_case(name))
    }
}

impl Default for RawSqlFilterNames {
    fn default() -> Self {
        RawSqlFilterNames {
            r#where: "_where".to_string(),
            select: "_select".to_string(),
            from: "_from".to_string(),
            join: "_join".to_string(),
            order_by: "_orderBy".to_string(),
        }
    }
}
