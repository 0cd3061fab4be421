//! Metadata information regarding the database entities and the shapes we project into.

use std::collections::BTreeMap;

use enum_iterator::Sequence;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The scalar types supported by the Engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Sequence, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Boolean,
    Integer,
    Bigint,
    Real,
    Numeric,
    Text,
    Date,
    Timestamp,
    Uuid,
    Json,
    Any,
}

impl ScalarType {
    /// Integer types accept whole numbers only.
    pub fn is_integral(self) -> bool {
        matches!(self, ScalarType::Integer | ScalarType::Bigint)
    }

    /// Fractional number types.
    pub fn is_fractional(self) -> bool {
        matches!(self, ScalarType::Real | ScalarType::Numeric)
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", format!("{self:?}").to_lowercase())
    }
}

/// Mapping from an entity name to its information.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct EntitiesInfo(pub BTreeMap<String, EntityInfo>);

impl EntitiesInfo {
    pub fn empty() -> Self {
        EntitiesInfo(BTreeMap::new())
    }
}

/// Information about an entity: a database table (or any other kind of relation)
/// and the shape of its rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EntityInfo {
    #[serde(default = "default_schema_name")]
    pub schema_name: String,
    pub table_name: String,
    /// Columns in the order they are returned.
    pub columns: Vec<ColumnInfo>,
    #[serde(default)]
    pub primary_key: Option<String>,
    /// Collections of related rows loaded after the main query.
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<ReferenceInfo>,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_schema_name() -> String {
    "main".to_string()
}

impl EntityInfo {
    /// Lookup a column by its name or wire alias, ignoring case.
    pub fn lookup_column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|column| column.matches(name))
    }

    /// The primary key column, if the entity has one.
    pub fn primary_key_column(&self) -> Option<&ColumnInfo> {
        self.primary_key
            .as_deref()
            .and_then(|key| self.lookup_column(key))
    }

    /// The default name of a column in another table referencing this entity's key,
    /// like `RockstarId` for the key `Id` of table `Rockstar`.
    pub fn default_foreign_key(&self) -> Option<String> {
        self.primary_key
            .as_ref()
            .map(|key| format!("{}{}", self.table_name, key))
    }
}

/// Can this column contain null values
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum Nullable {
    #[default]
    Nullable,
    NonNullable,
}

/// Information about a database column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnInfo {
    pub name: String,
    /// The name this column is known by on the wire, if different.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub r#type: ScalarType,
    #[serde(default)]
    pub nullable: Nullable,
}

impl ColumnInfo {
    /// The property name this column is returned as.
    pub fn wire_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Does the name refer to this column, by name or by alias, ignoring case.
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self
                .alias
                .as_deref()
                .is_some_and(|alias| alias.eq_ignore_ascii_case(name))
    }
}

/// A collection property holding the rows of another entity that reference this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReferenceInfo {
    /// The property name of the collection.
    pub name: String,
    /// The referencing entity.
    pub target: String,
    /// The referencing column. Defaults to the table name followed by the primary key name.
    #[serde(default)]
    pub foreign_key: Option<String>,
}

/// Mapping from a projection name to its information.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ProjectionsInfo(pub BTreeMap<String, ProjectionInfo>);

impl ProjectionsInfo {
    pub fn empty() -> Self {
        ProjectionsInfo(BTreeMap::new())
    }
}

/// A response shape that differs from the queried entity.
/// Each property is filled from the first matching column of any entity in scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectionInfo {
    pub properties: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}
