//! Resolve parameter names by convention: `AgeOlderThan`, `GreaterThanAge`, `>Age`, `Ids`.

use query_engine_metadata::metadata::{Operator, QueryTerm};

use super::filtering::{translate_values, PredicateTuple};
use super::templates::Template;
use super::values;
use crate::translation::error::Error;
use crate::translation::helpers::{strip_suffix_ignore_case, Scope, ScopedColumn};

/// The value a name is resolved with.
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    /// A typed value of a declared field.
    Json(&'a serde_json::Value),
    /// A raw string parameter. Lists are comma separated.
    Raw(&'a str),
}

impl FieldValue<'_> {
    fn is_array(self) -> bool {
        matches!(self, FieldValue::Json(serde_json::Value::Array(_)))
    }

    /// The values, with raw parameters split on commas when a list is expected.
    fn values(self, split: bool) -> Vec<serde_json::Value> {
        match self {
            FieldValue::Json(serde_json::Value::Array(values)) => values.clone(),
            FieldValue::Json(value) => vec![value.clone()],
            FieldValue::Raw(raw) if split => values::split_raw(raw),
            FieldValue::Raw(raw) => vec![serde_json::Value::String(raw.to_string())],
        }
    }
}

/// An operator implied by a keyword before or after a column name.
struct Convention {
    keyword: &'static str,
    operator: Operator,
    template: Option<&'static str>,
    value_format: Option<&'static str>,
}

const CASE_INSENSITIVE_LIKE: Option<&str> = Some("UPPER({Field}) LIKE UPPER({Value})");

const fn convention(keyword: &'static str, operator: Operator) -> Convention {
    Convention {
        keyword,
        operator,
        template: None,
        value_format: None,
    }
}

const fn like(keyword: &'static str, value_format: &'static str) -> Convention {
    Convention {
        keyword,
        operator: Operator::Like,
        template: CASE_INSENSITIVE_LIKE,
        value_format: Some(value_format),
    }
}

/// Longest keywords first, so `GreaterThanOrEqualTo` is never read as `GreaterThan`.
const CONVENTIONS: [Convention; 15] = [
    convention("GreaterThanOrEqualTo", Operator::GreaterThanOrEqualTo),
    convention("LessThanOrEqualTo", Operator::LessThanOrEqualTo),
    convention("GreaterThan", Operator::GreaterThan),
    convention("YoungerThan", Operator::LessThan),
    convention("NotEqualTo", Operator::NotEquals),
    like("StartsWith", "{0}%"),
    convention("OnOrBefore", Operator::LessThanOrEqualTo),
    convention("OnOrAfter", Operator::GreaterThanOrEqualTo),
    convention("OlderThan", Operator::GreaterThan),
    like("EndsWith", "%{0}"),
    convention("LessThan", Operator::LessThan),
    like("Contains", "%{0}%"),
    convention("Between", Operator::Between),
    convention("Before", Operator::LessThan),
    convention("After", Operator::GreaterThan),
];

/// Split an operator glued to a name, like `>Age` or `Age<`.
fn glued_operator(name: &str) -> Option<(&str, Operator)> {
    let leading = [
        (">=", Operator::GreaterThanOrEqualTo),
        (">", Operator::GreaterThanOrEqualTo),
        ("<=", Operator::LessThanOrEqualTo),
        ("<", Operator::LessThan),
    ];
    let trailing = [
        (">=", Operator::GreaterThanOrEqualTo),
        (">", Operator::GreaterThan),
        ("<=", Operator::LessThanOrEqualTo),
        ("<", Operator::LessThanOrEqualTo),
    ];
    leading
        .into_iter()
        .find_map(|(glue, operator)| {
            name.strip_prefix(glue)
                .filter(|rest| !rest.is_empty())
                .map(|rest| (rest, operator))
        })
        .or_else(|| {
            trailing.into_iter().find_map(|(glue, operator)| {
                name.strip_suffix(glue)
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| (rest, operator))
            })
        })
}

/// Resolve a name to a condition on a column in scope.
///
/// In order: an operator glued to a column name, an exact column name (lists compare with
/// `IN`), a column name with a convention keyword before or after it, and a plural column
/// name compared with `IN`. Names that resolve to nothing are ignored.
/// `ageGreaterThan` resolves, `AgeGREATERTHAN` does not.
pub fn resolve_name(
    scope: &Scope,
    term: QueryTerm,
    name: &str,
    value: FieldValue,
) -> Result<Option<PredicateTuple>, Error> {
    let tuple = |column: ScopedColumn,
                 operator: Operator,
                 template: Option<&str>,
                 format: Option<&str>,
                 split: bool|
     -> Result<Option<PredicateTuple>, Error> {
        let values = value.values(split);
        // an empty list is unset
        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(PredicateTuple {
            values: translate_values(&column, &values, format)?,
            column,
            operator,
            term,
            template: template.map(Template::parse).transpose()?,
        }))
    };

    if let Some((column_name, operator)) = glued_operator(name) {
        if let Some(column) = scope.lookup_column(column_name) {
            return tuple(column, operator, None, None, false);
        }
    }

    if let Some(column) = scope.lookup_column(name) {
        let operator = if value.is_array() {
            Operator::In
        } else {
            Operator::Equals
        };
        return tuple(column, operator, None, None, false);
    }

    // keywords match exactly, the column part ignores case
    for convention in &CONVENTIONS {
        let candidates = [
            name.strip_suffix(convention.keyword),
            name.strip_prefix(convention.keyword),
        ];
        for column_name in candidates.into_iter().flatten().filter(|rest| !rest.is_empty()) {
            if let Some(column) = scope.lookup_column_or_plural(column_name) {
                return tuple(
                    column,
                    convention.operator,
                    convention.template,
                    convention.value_format,
                    convention.operator == Operator::Between,
                );
            }
        }
    }

    if let Some(column) =
        strip_suffix_ignore_case(name, "s").and_then(|singular| scope.lookup_column(singular))
    {
        return tuple(column, Operator::In, None, None, true);
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glued_operators_compare_inclusively_on_the_open_side() {
        assert_eq!(
            glued_operator(">Age"),
            Some(("Age", Operator::GreaterThanOrEqualTo))
        );
        assert_eq!(glued_operator("Age>"), Some(("Age", Operator::GreaterThan)));
        assert_eq!(glued_operator("<Age"), Some(("Age", Operator::LessThan)));
        assert_eq!(
            glued_operator("Age<"),
            Some(("Age", Operator::LessThanOrEqualTo))
        );
        assert_eq!(glued_operator(">"), None);
        assert_eq!(glued_operator("Age"), None);
    }

    #[test]
    fn keywords_are_ordered_longest_first() {
        for (index, convention) in CONVENTIONS.iter().enumerate() {
            for later in &CONVENTIONS[index + 1..] {
                assert!(
                    !later.keyword.ends_with(convention.keyword)
                        && !later.keyword.starts_with(convention.keyword),
                    "{} shadows {}",
                    convention.keyword,
                    later.keyword
                );
            }
        }
    }
}
