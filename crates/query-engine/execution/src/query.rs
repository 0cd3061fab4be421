//! Execute an execution plan against the database.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::{info_span, Instrument};

use query_engine_sql::sql;

use crate::error::{Error, QueryError};
use crate::metrics;
use crate::response::{self, QueryResponse};
use crate::rows::{self, build_query_with_params, Row};

/// The most parent keys bound to one reference query.
const REFERENCE_BATCH_SIZE: usize = 500;

/// Execute a plan: the rows query, then the count, aggregate and reference queries it needs,
/// one after the other on the same connection.
pub async fn execute(
    connection: &mut sqlx::SqliteConnection,
    metrics: &metrics::Metrics,
    plan: &sql::execution_plan::ExecutionPlan,
) -> Result<QueryResponse, Error> {
    let query = plan.query_sql();

    tracing::info!(
        root = %plan.root,
        generated_sql = %query.sql,
        params = ?&query.params,
    );

    let mut results = async {
        let fetched = build_query_with_params(&query)
            .fetch_all(&mut *connection)
            .await?;
        fetched
            .iter()
            .map(|row| rows::decode_row(row).map(|decoded| shape_row(plan, decoded)))
            .collect::<Result<Vec<_>, Error>>()
    }
    .instrument(info_span!("Execute query"))
    .await?;
    metrics.query_total.inc();

    let total = if plan.needs_count(results.len()) {
        let query = plan.count_sql();
        tracing::info!(generated_sql = %query.sql, params = ?&query.params);
        let count: i64 = async {
            let row = build_query_with_params(&query)
                .fetch_one(&mut *connection)
                .await?;
            sqlx::Row::try_get(&row, 0)
        }
        .instrument(info_span!("Count query"))
        .await?;
        metrics.count_query_total.inc();
        u64::try_from(count).unwrap_or_default()
    } else {
        u64::from(plan.offset()) + u64::try_from(results.len()).unwrap_or(u64::MAX)
    };

    let meta = match plan.aggregates_sql() {
        None => None,
        Some(query) => {
            tracing::info!(generated_sql = %query.sql, params = ?&query.params);
            let row = async {
                let row = build_query_with_params(&query)
                    .fetch_one(&mut *connection)
                    .await?;
                rows::decode_row(&row)
            }
            .instrument(info_span!("Aggregate query"))
            .await?;
            metrics.aggregate_query_total.inc();
            Some(
                plan.aggregates
                    .iter()
                    .zip(row.values())
                    .map(|(aggregate, value)| {
                        (aggregate.label.clone(), response::aggregate_text(value))
                    })
                    .collect(),
            )
        }
    };

    for reference in &plan.references {
        load_references(connection, metrics, reference, &mut results)
            .instrument(info_span!("Load references", property = %reference.property))
            .await?;
    }

    Ok(QueryResponse {
        offset: plan.offset(),
        total,
        results,
        meta,
    })
}

/// Lay a row out in the plan's shape. Properties nothing was selected for are null.
/// Rows of a raw select list keep the columns they have.
fn shape_row(plan: &sql::execution_plan::ExecutionPlan, mut decoded: Row) -> Row {
    match &plan.select.select_list {
        sql::ast::SelectList::SelectList(columns) if !columns.is_empty() => plan
            .shape
            .iter()
            .map(|property| {
                let value = decoded
                    .swap_remove(property)
                    .unwrap_or(serde_json::Value::Null);
                (property.clone(), value)
            })
            .collect(),
        _ => decoded,
    }
}

/// Load a reference collection into each row, in batches of parent keys.
/// Rows without related rows get null.
async fn load_references(
    connection: &mut sqlx::SqliteConnection,
    metrics: &metrics::Metrics,
    reference: &sql::execution_plan::ReferenceLoad,
    results: &mut [Row],
) -> Result<(), Error> {
    let keys = parent_keys(reference, results)?;

    let mut related: HashMap<String, Vec<serde_json::Value>> = HashMap::new();
    for batch in keys.chunks(REFERENCE_BATCH_SIZE) {
        let query = reference.query_sql(batch.to_vec());
        tracing::info!(generated_sql = %query.sql, params = ?&query.params);
        let fetched = build_query_with_params(&query)
            .fetch_all(&mut *connection)
            .await?;
        metrics.reference_query_total.inc();
        for row in &fetched {
            let decoded = rows::decode_row(row)?;
            let parent = decoded
                .get(&reference.foreign_key_property)
                .map(ToString::to_string)
                .unwrap_or_default();
            related
                .entry(parent)
                .or_default()
                .push(serde_json::Value::Object(decoded.into_iter().collect()));
        }
    }

    for row in results.iter_mut() {
        let collection = row
            .get(&reference.key_property)
            .and_then(|key| related.get(&key.to_string()))
            .map_or(serde_json::Value::Null, |rows| {
                serde_json::Value::Array(rows.clone())
            });
        row.insert(reference.property.clone(), collection);
    }
    Ok(())
}

/// The distinct non-null parent keys of the rows, in row order.
fn parent_keys(
    reference: &sql::execution_plan::ReferenceLoad,
    results: &[Row],
) -> Result<Vec<sql::ast::Value>, Error> {
    // keyed by the JSON text rows are matched on
    let mut keys: IndexMap<String, sql::ast::Value> = IndexMap::new();
    for row in results {
        let key = row
            .get(&reference.key_property)
            .ok_or_else(|| QueryError::MissingKey {
                reference: reference.property.clone(),
                property: reference.key_property.clone(),
            })?;
        if let Some(value) = key_value(key) {
            keys.entry(key.to_string()).or_insert(value);
        }
    }
    Ok(keys.into_values().collect())
}

/// The SQL value of a parent key. Null keys relate to nothing.
fn key_value(key: &serde_json::Value) -> Option<sql::ast::Value> {
    match key {
        serde_json::Value::Number(n) => Some(match n.as_i64() {
            Some(i) => sql::ast::Value::Int8(i),
            None => sql::ast::Value::Float8(n.as_f64()?),
        }),
        serde_json::Value::String(s) => Some(sql::ast::Value::String(s.clone())),
        serde_json::Value::Bool(b) => Some(sql::ast::Value::Bool(*b)),
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            None
        }
    }
}
