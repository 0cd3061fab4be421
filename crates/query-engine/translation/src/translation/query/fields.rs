//! Handle the select list and the shape of result rows.

use query_engine_metadata::metadata::DescriptorInfo;
use query_engine_sql::sql;

use crate::translation::error::Error;
use crate::translation::helpers::{Env, Scope};

/// The select list of a descriptor and the properties of its result rows.
///
/// Rows have the shape of the descriptor's projection, or of its primary entity.
/// Projection properties are filled from the first matching column in scope. Properties
/// nothing matches are left out of the select list and come back as null.
pub fn translate_fields(
    env: &Env,
    scope: &Scope,
    descriptor: &DescriptorInfo,
) -> Result<(Vec<(sql::ast::ColumnAlias, sql::ast::Expression)>, Vec<String>), Error> {
    match &descriptor.into {
        Some(projection) => {
            let projection = env.lookup_projection(projection)?;
            let columns = projection
                .properties
                .iter()
                .filter_map(|property| {
                    scope.lookup_column(property).map(|column| {
                        (
                            sql::helpers::make_column_alias(property.clone()),
                            column.expression(),
                        )
                    })
                })
                .collect();
            Ok((columns, projection.properties.clone()))
        }
        None => {
            let primary = scope.primary();
            let columns: Vec<_> = primary
                .info
                .columns
                .iter()
                .map(|column| {
                    let column = primary.column(column);
                    (
                        sql::helpers::make_column_alias(column.wire_name.clone()),
                        column.expression(),
                    )
                })
                .collect();
            let shape = columns
                .iter()
                .map(|(alias, _)| alias.name.clone())
                .collect();
            Ok((columns, shape))
        }
    }
}
