//! Translate `orderBy` and `orderByDesc` into an ORDER BY clause.

use query_engine_sql::sql;

use crate::translation::helpers::Scope;

/// Translate comma separated column lists into ORDER BY elements, `orderBy` keys first.
/// A `-` before a column flips its direction. Unknown columns are skipped.
pub fn translate_order_by(
    scope: &Scope,
    order_by: Option<&str>,
    order_by_desc: Option<&str>,
) -> Vec<sql::ast::OrderByElement> {
    [
        (order_by, sql::ast::OrderByDirection::Asc),
        (order_by_desc, sql::ast::OrderByDirection::Desc),
    ]
    .into_iter()
    .filter_map(|(keys, direction)| keys.map(|keys| (keys, direction)))
    .flat_map(|(keys, direction)| {
        keys.split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(move |key| match key.strip_prefix('-') {
                Some(key) => (key.trim(), direction.flip()),
                None => (key, direction),
            })
    })
    .filter_map(|(key, direction)| match scope.lookup_column(key) {
        Some(column) => Some(sql::ast::OrderByElement {
            target: column.expression(),
            direction,
        }),
        None => {
            tracing::debug!("ignoring unknown order by column '{key}'");
            None
        }
    })
    .collect()
}
