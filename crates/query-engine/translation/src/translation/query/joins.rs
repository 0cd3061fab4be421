//! Join the descriptor's secondary entities to its primary entity.

use query_engine_metadata::metadata::{DescriptorInfo, JoinKind};
use query_engine_sql::sql;

use crate::translation::error::Error;
use crate::translation::helpers::Scope;

/// Translate the declared joins, in declaration order.
/// Each joined entity references the primary key of the primary entity, by default through
/// a column named after the primary table and its key, like `RockstarId`.
pub fn translate_joins(
    scope: &Scope,
    descriptor: &DescriptorInfo,
) -> Result<Vec<sql::ast::Join>, Error> {
    let primary = scope.primary();
    descriptor
        .joins
        .iter()
        .zip(scope.joined())
        .map(|(join, secondary)| {
            let primary_key = primary.primary_key()?;
            let key = match &join.key {
                Some(key) => key.clone(),
                None => primary
                    .info
                    .default_foreign_key()
                    .ok_or_else(|| Error::PrimaryKeyNotFound(primary.name.clone()))?,
            };
            let foreign_key = secondary.expect_column(&key)?;

            let on = sql::ast::Expression::BinaryOperation {
                left: Box::new(foreign_key.expression()),
                operator: sql::ast::BinaryOperator("=".to_string()),
                right: Box::new(primary_key.expression()),
            };
            let reference = sql::helpers::db_table(
                &secondary.info.schema_name,
                &secondary.info.table_name,
            );
            let alias = sql::helpers::make_table_alias(secondary.name.clone());

            Ok(match join.kind {
                JoinKind::Inner => sql::ast::Join::InnerJoin(sql::ast::InnerJoin {
                    reference,
                    alias,
                    on,
                }),
                JoinKind::Left => sql::ast::Join::LeftOuterJoin(sql::ast::LeftOuterJoin {
                    reference,
                    alias,
                    on,
                }),
            })
        })
        .collect()
}
