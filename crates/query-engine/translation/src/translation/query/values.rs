//! Handle the translation of literal values.

use query_engine_metadata::metadata::database::ScalarType;
use query_engine_sql::sql;

use crate::translation::error::Error;

/// Convert a JSON value into a SQL value of a column's type.
/// Strings are accepted for every type, as that is how most transports deliver them.
pub fn translate_json_value(
    value: &serde_json::Value,
    scalar_type: ScalarType,
) -> Result<sql::ast::Value, Error> {
    let mismatch = || Error::InvalidValue {
        value: value.clone(),
        expected: scalar_type,
    };
    match value {
        // null
        serde_json::Value::Null => Ok(sql::ast::Value::Null),

        // numbers
        serde_json::Value::Number(num) => match scalar_type {
            ScalarType::Integer | ScalarType::Bigint => num
                .as_i64()
                .map(sql::ast::Value::Int8)
                .ok_or_else(mismatch),
            ScalarType::Real | ScalarType::Numeric => num
                .as_f64()
                .map(sql::ast::Value::Float8)
                .ok_or_else(mismatch),
            ScalarType::Any => Ok(number_value(num)),
            ScalarType::Text | ScalarType::Json => Ok(sql::ast::Value::String(num.to_string())),
            ScalarType::Boolean
            | ScalarType::Date
            | ScalarType::Timestamp
            | ScalarType::Uuid => Err(mismatch()),
        },

        // booleans
        serde_json::Value::Bool(b) => match scalar_type {
            ScalarType::Boolean | ScalarType::Any => Ok(sql::ast::Value::Bool(*b)),
            ScalarType::Text | ScalarType::Json => Ok(sql::ast::Value::String(b.to_string())),
            _ => Err(mismatch()),
        },

        // strings
        serde_json::Value::String(s) => match scalar_type {
            ScalarType::Integer | ScalarType::Bigint => s
                .trim()
                .parse::<i64>()
                .map(sql::ast::Value::Int8)
                .map_err(|_| mismatch()),
            ScalarType::Real | ScalarType::Numeric => s
                .trim()
                .parse::<f64>()
                .map(sql::ast::Value::Float8)
                .map_err(|_| mismatch()),
            ScalarType::Boolean => match s.trim().to_lowercase().as_str() {
                "true" => Ok(sql::ast::Value::Bool(true)),
                "false" => Ok(sql::ast::Value::Bool(false)),
                _ => Err(mismatch()),
            },
            // stored lowercase and hyphenated
            ScalarType::Uuid => uuid::Uuid::parse_str(s.trim())
                .map(|uuid| sql::ast::Value::String(uuid.hyphenated().to_string()))
                .map_err(|_| mismatch()),
            ScalarType::Text
            | ScalarType::Date
            | ScalarType::Timestamp
            | ScalarType::Json
            | ScalarType::Any => Ok(sql::ast::Value::String(s.clone())),
        },

        // not supported
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(mismatch()),
    }
}

fn number_value(num: &serde_json::Number) -> sql::ast::Value {
    match num.as_i64() {
        Some(i) => sql::ast::Value::Int8(i),
        None => sql::ast::Value::Float8(num.as_f64().unwrap_or(f64::NAN)),
    }
}

/// The text of a scalar value, as it is substituted into value formats.
pub fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Split a raw comma separated parameter into its values.
pub fn split_raw(raw: &str) -> Vec<serde_json::Value> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| serde_json::Value::String(part.to_string()))
        .collect()
}
