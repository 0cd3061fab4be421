//! Metadata information regarding registered query descriptors.
//!
//! A descriptor is registered once and names everything needed to resolve a request against it:
//! the entity it queries, the shape it returns, its declared fields and how each one becomes a
//! predicate, the entities it joins, and the capability tags extension filters dispatch on.

use std::collections::{BTreeMap, BTreeSet};

use enum_iterator::Sequence;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::database::ScalarType;

/// Mapping from a descriptor name to its information.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct DescriptorsInfo(pub BTreeMap<String, DescriptorInfo>);

impl DescriptorsInfo {
    pub fn empty() -> Self {
        DescriptorsInfo(BTreeMap::new())
    }
}

/// Information about a query descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DescriptorInfo {
    /// The primary entity.
    pub from: String,
    /// The projection results are returned as. Defaults to the primary entity's own shape.
    #[serde(default)]
    pub into: Option<String>,
    /// How the predicates of this descriptor are combined.
    #[serde(default)]
    pub term: QueryTerm,
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
    /// Joined entities, in JOIN clause order.
    #[serde(default)]
    pub joins: Vec<JoinInfo>,
    /// Capability tags used to dispatch query filters.
    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub capabilities: BTreeSet<SmolStr>,
    #[serde(default)]
    pub description: Option<String>,
}

impl DescriptorInfo {
    /// Lookup a declared field by its name or wire alias, ignoring case.
    pub fn lookup_field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|field| {
            field.name.eq_ignore_ascii_case(name)
                || field
                    .alias
                    .as_deref()
                    .is_some_and(|alias| alias.eq_ignore_ascii_case(name))
        })
    }
}

/// Whether clauses are combined with AND or OR.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Sequence,
    Serialize,
    Deserialize,
    JsonSchema,
)]
pub enum QueryTerm {
    #[default]
    And,
    Or,
}

/// A declared field of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldInfo {
    pub name: String,
    /// The name this field is known by on the wire, if different.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub r#type: FieldType,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directive: Option<FieldDirective>,
}

/// The declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    ScalarType(ScalarType),
    ArrayType(ScalarType),
}

impl FieldType {
    pub fn is_array(self) -> bool {
        matches!(self, FieldType::ArrayType(_))
    }

    pub fn scalar_type(self) -> ScalarType {
        match self {
            FieldType::ScalarType(scalar_type) | FieldType::ArrayType(scalar_type) => scalar_type,
        }
    }
}

/// Explicit instructions for turning a field into a predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldDirective {
    #[serde(default)]
    pub operator: Option<Operator>,
    /// A template with `{Field}`, `{Value}`, `{Value1}`, `{Value2}` or `{Values}` placeholders.
    #[serde(default)]
    pub template: Option<String>,
    /// The column compared. Defaults to the field name.
    #[serde(default)]
    pub field: Option<String>,
    /// Wraps each value, `{0}` standing for the value, like `{0}%`.
    #[serde(default)]
    pub value_format: Option<String>,
    /// Overrides the descriptor's term for this field.
    #[serde(default)]
    pub term: Option<QueryTerm>,
}

/// The operators a field can be compared with.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Sequence,
    Serialize,
    Deserialize,
    JsonSchema,
)]
pub enum Operator {
    #[serde(rename = "=")]
    Equals,
    #[serde(rename = "!=")]
    NotEquals,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterThanOrEqualTo,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessThanOrEqualTo,
    #[serde(rename = "LIKE")]
    Like,
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "BETWEEN")]
    Between,
}

impl Operator {
    /// The SQL spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::NotEquals => "<>",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqualTo => ">=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqualTo => "<=",
            Operator::Like => "LIKE",
            Operator::In => "IN",
            Operator::Between => "BETWEEN",
        }
    }

    /// The template a field with only this operator is rendered with.
    pub fn default_template(self) -> &'static str {
        match self {
            Operator::Equals => "{Field} = {Value}",
            Operator::NotEquals => "{Field} <> {Value}",
            Operator::GreaterThan => "{Field} > {Value}",
            Operator::GreaterThanOrEqualTo => "{Field} >= {Value}",
            Operator::LessThan => "{Field} < {Value}",
            Operator::LessThanOrEqualTo => "{Field} <= {Value}",
            Operator::Like => "{Field} LIKE {Value}",
            Operator::In => "{Field} IN ({Values})",
            Operator::Between => "{Field} BETWEEN {Value1} AND {Value2}",
        }
    }
}

/// A join from the primary entity to a secondary one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct JoinInfo {
    pub entity: String,
    #[serde(default)]
    pub kind: JoinKind,
    /// The column of the joined entity referencing the primary key.
    /// Defaults to the primary table name followed by the primary key name.
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
}
