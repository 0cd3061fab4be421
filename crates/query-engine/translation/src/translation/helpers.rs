//! Helpers for processing the QueryRequest and building SQL.

use autoquery_configuration::QuerySettings;
use query_engine_metadata::metadata;
use query_engine_sql::sql;

use super::error::Error;

/// Static information from the configuration.
pub struct Env<'a> {
    metadata: &'a metadata::Metadata,
    pub settings: &'a QuerySettings,
}

/// The entities a descriptor can see: the primary entity followed by its joins, in join order.
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    entities: Vec<ScopedEntity>,
}

/// An entity in scope, and the alias it is addressed by in the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedEntity {
    /// Entity name for column lookup. Also used as the table alias.
    pub name: String,
    pub info: metadata::EntityInfo,
    /// Table alias to query from
    pub reference: sql::ast::TableReference,
}

/// A column of an entity in scope.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedColumn {
    /// The property name the column is returned as.
    pub wire_name: String,
    pub scalar_type: metadata::ScalarType,
    pub reference: sql::ast::ColumnReference,
}

impl ScopedColumn {
    pub fn expression(&self) -> sql::ast::Expression {
        sql::ast::Expression::ColumnReference(self.reference.clone())
    }
}

impl<'a> Env<'a> {
    /// Create a new Env by supplying the metadata and query settings.
    pub fn new(metadata: &'a metadata::Metadata, settings: &'a QuerySettings) -> Env<'a> {
        Env { metadata, settings }
    }

    /// Lookup a query descriptor by name.
    pub fn lookup_descriptor(&self, name: &str) -> Result<&'a metadata::DescriptorInfo, Error> {
        self.metadata
            .descriptors
            .0
            .get(name)
            .ok_or_else(|| Error::DescriptorNotFound(name.to_string()))
    }

    /// Lookup an entity by name.
    pub fn lookup_entity(&self, name: &str) -> Result<&'a metadata::EntityInfo, Error> {
        self.metadata
            .entities
            .0
            .get(name)
            .ok_or_else(|| Error::EntityNotFound(name.to_string()))
    }

    /// Lookup a projection by name.
    pub fn lookup_projection(&self, name: &str) -> Result<&'a metadata::ProjectionInfo, Error> {
        self.metadata
            .projections
            .0
            .get(name)
            .ok_or_else(|| Error::ProjectionNotFound(name.to_string()))
    }

    /// Collect the entities a descriptor queries.
    pub fn scope_for(&self, descriptor: &metadata::DescriptorInfo) -> Result<Scope, Error> {
        let mut entities = vec![ScopedEntity::new(
            &descriptor.from,
            self.lookup_entity(&descriptor.from)?,
        )];
        for join in &descriptor.joins {
            entities.push(ScopedEntity::new(
                &join.entity,
                self.lookup_entity(&join.entity)?,
            ));
        }
        Ok(Scope { entities })
    }
}

impl ScopedEntity {
    pub fn new(name: &str, info: &metadata::EntityInfo) -> ScopedEntity {
        ScopedEntity {
            name: name.to_string(),
            info: info.clone(),
            reference: sql::ast::TableReference::AliasedTable(sql::helpers::make_table_alias(
                name.to_string(),
            )),
        }
    }

    /// The table this entity is selected from, and the alias it is addressed by.
    pub fn from_clause(&self) -> sql::ast::From {
        sql::ast::From::Table {
            reference: sql::helpers::db_table(&self.info.schema_name, &self.info.table_name),
            alias: sql::helpers::make_table_alias(self.name.clone()),
        }
    }

    pub fn column(&self, column: &metadata::ColumnInfo) -> ScopedColumn {
        ScopedColumn {
            wire_name: column.wire_name().to_string(),
            scalar_type: column.r#type,
            reference: sql::ast::ColumnReference::TableColumn {
                table: self.reference.clone(),
                name: sql::ast::ColumnName(column.name.clone()),
            },
        }
    }

    /// Lookup a column by name or alias.
    pub fn lookup_column(&self, name: &str) -> Option<ScopedColumn> {
        self.info.lookup_column(name).map(|column| self.column(column))
    }

    /// Lookup a column whose name is prefixed by the entity or table name,
    /// like `RockstarAlbumName` for column `Name` of `RockstarAlbum`.
    fn lookup_qualified_column(&self, name: &str) -> Option<ScopedColumn> {
        [self.name.as_str(), self.info.table_name.as_str()]
            .into_iter()
            .filter_map(|prefix| strip_prefix_ignore_case(name, prefix))
            .find_map(|rest| self.lookup_column(rest))
    }

    /// Lookup a column, failing when it is not there.
    pub fn expect_column(&self, name: &str) -> Result<ScopedColumn, Error> {
        self.lookup_column(name)
            .ok_or_else(|| Error::ColumnNotFound {
                entity: self.name.clone(),
                column: name.to_string(),
            })
    }

    /// The primary key column.
    pub fn primary_key(&self) -> Result<ScopedColumn, Error> {
        self.info
            .primary_key_column()
            .map(|column| self.column(column))
            .ok_or_else(|| Error::PrimaryKeyNotFound(self.name.clone()))
    }
}

impl Scope {
    /// The entity the descriptor queries from.
    pub fn primary(&self) -> &ScopedEntity {
        &self.entities[0]
    }

    /// The joined entities, in join order.
    pub fn joined(&self) -> &[ScopedEntity] {
        &self.entities[1..]
    }

    /// Lookup a column by name in every entity in scope, primary entity first.
    /// Bare names are preferred over names qualified with an entity name.
    pub fn lookup_column(&self, name: &str) -> Option<ScopedColumn> {
        self.entities
            .iter()
            .find_map(|entity| entity.lookup_column(name))
            .or_else(|| {
                self.entities
                    .iter()
                    .find_map(|entity| entity.lookup_qualified_column(name))
            })
    }

    /// Lookup a column by name, or by its plural: `Ids` finds `Id`.
    pub fn lookup_column_or_plural(&self, name: &str) -> Option<ScopedColumn> {
        self.lookup_column(name).or_else(|| {
            strip_suffix_ignore_case(name, "s").and_then(|singular| self.lookup_column(singular))
        })
    }

    /// Lookup a column, failing when it is not in scope.
    pub fn expect_column(&self, name: &str) -> Result<ScopedColumn, Error> {
        self.lookup_column(name).ok_or_else(|| Error::ColumnNotFound {
            entity: self.primary().name.clone(),
            column: name.to_string(),
        })
    }
}

/// Strip a prefix ignoring ASCII case, leaving a non-empty rest.
pub fn strip_prefix_ignore_case<'s>(name: &'s str, prefix: &str) -> Option<&'s str> {
    name.get(..prefix.len())
        .filter(|head| head.eq_ignore_ascii_case(prefix))
        .and_then(|_| name.get(prefix.len()..))
        .filter(|rest| !rest.is_empty())
}

/// Strip a suffix ignoring ASCII case, leaving a non-empty rest.
pub fn strip_suffix_ignore_case<'s>(name: &'s str, suffix: &str) -> Option<&'s str> {
    let split = name.len().checked_sub(suffix.len())?;
    name.get(split..)
        .filter(|tail| tail.eq_ignore_ascii_case(suffix))
        .and_then(|_| name.get(..split))
        .filter(|rest| !rest.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_and_suffixes_ignore_case() {
        assert_eq!(strip_prefix_ignore_case("greaterThanAge", "GreaterThan"), Some("Age"));
        assert_eq!(strip_suffix_ignore_case("AgeOLDERTHAN", "OlderThan"), Some("Age"));
        assert_eq!(strip_suffix_ignore_case("After", "After"), None);
        assert_eq!(strip_prefix_ignore_case("Id", "Identifier"), None);
    }
}
