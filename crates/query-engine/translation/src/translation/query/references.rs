//! Plan the loading of reference collections, like the albums of each rockstar.

use query_engine_sql::sql;

use crate::translation::error::Error;
use crate::translation::helpers::{Env, Scope, ScopedEntity};

/// Plan one query per reference of the primary entity.
/// The referenced rows are ordered by their primary key, when they have one.
pub fn translate_references(
    env: &Env,
    scope: &Scope,
) -> Result<Vec<sql::execution_plan::ReferenceLoad>, Error> {
    let primary = scope.primary();
    primary
        .info
        .references
        .iter()
        .map(|reference| {
            let key = primary.primary_key()?;
            let target = ScopedEntity::new(&reference.target, env.lookup_entity(&reference.target)?);
            let foreign_key_name = match &reference.foreign_key {
                Some(foreign_key) => foreign_key.clone(),
                None => primary
                    .info
                    .default_foreign_key()
                    .ok_or_else(|| Error::PrimaryKeyNotFound(primary.name.clone()))?,
            };
            let foreign_key = target.expect_column(&foreign_key_name)?;

            let columns: Vec<_> = target
                .info
                .columns
                .iter()
                .map(|column| target.column(column))
                .collect();
            let mut select = sql::helpers::simple_select(
                columns
                    .iter()
                    .map(|column| {
                        (
                            sql::helpers::make_column_alias(column.wire_name.clone()),
                            column.expression(),
                        )
                    })
                    .collect(),
            );
            select.from = Some(target.from_clause());
            if let Ok(target_key) = target.primary_key() {
                select.order_by.elements.push(sql::ast::OrderByElement {
                    target: target_key.expression(),
                    direction: sql::ast::OrderByDirection::Asc,
                });
            }

            Ok(sql::execution_plan::ReferenceLoad {
                property: reference.name.clone(),
                key_property: key.wire_name,
                select,
                foreign_key: foreign_key.expression(),
                foreign_key_property: foreign_key.wire_name,
                shape: columns.into_iter().map(|column| column.wire_name).collect(),
            })
        })
        .collect()
}
