//! The request a query descriptor is executed with.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A request against a query descriptor.
///
/// `fields` holds typed values of declared fields. `params` holds raw string parameters, as
/// a transport like a query string delivers them: paging and `include` options, declared
/// fields, raw SQL fragments and free parameters resolved by naming convention.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub descriptor: String,
    #[serde(default)]
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub fields: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub params: IndexMap<String, String>,
    #[serde(default)]
    pub skip: Option<u32>,
    #[serde(default)]
    pub take: Option<u32>,
    #[serde(default)]
    pub order_by: Option<String>,
    #[serde(default)]
    pub order_by_desc: Option<String>,
    #[serde(default)]
    pub include: Option<String>,
}

impl QueryRequest {
    pub fn new(descriptor: impl Into<String>) -> Self {
        QueryRequest {
            descriptor: descriptor.into(),
            ..QueryRequest::default()
        }
    }

    /// A request from raw string parameters, in the order they were given.
    pub fn from_params<K, V>(
        descriptor: impl Into<String>,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        QueryRequest {
            params: params
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
            ..QueryRequest::new(descriptor)
        }
    }

    /// Set a declared field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Add a raw parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn take(mut self, take: u32) -> Self {
        self.take = Some(take);
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn order_by_desc(mut self, order_by_desc: impl Into<String>) -> Self {
        self.order_by_desc = Some(order_by_desc.into());
        self
    }

    pub fn include(mut self, include: impl Into<String>) -> Self {
        self.include = Some(include.into());
        self
    }

    /// The typed value of a declared field, by name or alias, ignoring case.
    pub fn field_value(&self, names: &[&str]) -> Option<&serde_json::Value> {
        self.fields
            .iter()
            .find(|(key, _)| names.iter().any(|name| key.eq_ignore_ascii_case(name)))
            .map(|(_, value)| value)
    }
}
