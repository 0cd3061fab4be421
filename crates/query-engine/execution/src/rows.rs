//! Bind parameters to queries and decode the rows they return.

use indexmap::IndexMap;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row as _, Sqlite, TypeInfo, ValueRef};

use query_engine_sql::sql;

use crate::error::{Error, QueryError};

/// A result row: property names and values, in select list order.
pub type Row = IndexMap<String, serde_json::Value>;

/// Create a SQLx query based on our SQL query and bind our parameters to it.
pub fn build_query_with_params(
    query: &sql::string::SQL,
) -> sqlx::query::Query<'_, Sqlite, SqliteArguments<'_>> {
    query
        .params
        .iter()
        .fold(sqlx::query(query.sql.as_str()), |sqlx_query, param| {
            match param {
                sql::string::Param::String(s) => sqlx_query.bind(s.as_str()),
                sql::string::Param::Value(serde_json::Value::Number(n)) => match n.as_i64() {
                    Some(i) => sqlx_query.bind(i),
                    None => sqlx_query.bind(n.as_f64()),
                },
                sql::string::Param::Value(serde_json::Value::Bool(b)) => sqlx_query.bind(*b),
                sql::string::Param::Value(serde_json::Value::Null) => {
                    sqlx_query.bind(None::<String>)
                }
                sql::string::Param::Value(serde_json::Value::String(s)) => {
                    sqlx_query.bind(s.as_str())
                }
                sql::string::Param::Value(other) => sqlx_query.bind(other.to_string()),
            }
        })
}

/// Decode a row by the storage class of each value.
pub fn decode_row(row: &SqliteRow) -> Result<Row, Error> {
    row.columns()
        .iter()
        .map(|column| {
            let value = decode_value(row, column.ordinal(), column.name())?;
            Ok((column.name().to_string(), value))
        })
        .collect()
}

fn decode_value(row: &SqliteRow, index: usize, name: &str) -> Result<serde_json::Value, Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(serde_json::Value::Null);
    }
    let type_info = raw.type_info();
    match type_info.name() {
        "INTEGER" | "BOOLEAN" => Ok(row.try_get_unchecked::<i64, _>(index)?.into()),
        "REAL" | "NUMERIC" => {
            let n = row.try_get_unchecked::<f64, _>(index)?;
            Ok(serde_json::Number::from_f64(n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number))
        }
        "TEXT" | "DATE" | "TIME" | "DATETIME" => {
            Ok(serde_json::Value::String(row.try_get_unchecked(index)?))
        }
        "BLOB" => {
            let bytes: Vec<u8> = row.try_get_unchecked(index)?;
            Ok(serde_json::Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        }
        type_name => Err(QueryError::UnsupportedValue {
            column: name.to_string(),
            type_name: type_name.to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::Connection;

    #[tokio::test]
    async fn values_decode_by_storage_class() {
        let mut connection = sqlx::SqliteConnection::connect("sqlite::memory:")
            .await
            .unwrap();
        let mut query = sql::string::SQL::new();
        query.append_syntax("SELECT ");
        query.append_param(sql::string::Param::Value(json!(42)));
        query.append_syntax(" AS \"Int\", ");
        query.append_param(sql::string::Param::Value(json!(8.5)));
        query.append_syntax(" AS \"Real\", ");
        query.append_param(sql::string::Param::String("Jim'\"".to_string()));
        query.append_syntax(" AS \"Text\", NULL AS \"Null\", X'4869' AS \"Blob\"");

        let row = build_query_with_params(&query)
            .fetch_one(&mut connection)
            .await
            .unwrap();

        assert_eq!(
            decode_row(&row).unwrap(),
            Row::from([
                ("Int".to_string(), json!(42)),
                ("Real".to_string(), json!(8.5)),
                ("Text".to_string(), json!("Jim'\"")),
                ("Null".to_string(), json!(null)),
                ("Blob".to_string(), json!("Hi")),
            ])
        );
    }
}
