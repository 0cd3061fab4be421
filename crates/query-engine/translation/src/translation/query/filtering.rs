//! Turn resolved fields into predicates and combine them into a WHERE clause.

use query_engine_metadata::metadata::{FieldInfo, Operator, QueryTerm};
use query_engine_sql::sql;

use super::conventions;
use super::templates::Template;
use super::values;
use crate::translation::error::Error;
use crate::translation::helpers::{Scope, ScopedColumn};

/// A resolved condition: which column, compared how, against which values,
/// and which term it is combined with.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateTuple {
    pub column: ScopedColumn,
    pub operator: Operator,
    pub term: QueryTerm,
    pub template: Option<Template>,
    pub values: Vec<sql::ast::Value>,
}

impl PredicateTuple {
    /// Render the condition.
    pub fn to_expression(&self) -> Result<sql::ast::Expression, Error> {
        match &self.template {
            Some(template) => self.render(template),
            None => match self.operator {
                Operator::In => Ok(sql::ast::Expression::BinaryArrayOperation {
                    left: Box::new(self.column.expression()),
                    operator: sql::ast::BinaryArrayOperator::In,
                    right: self
                        .values
                        .iter()
                        .cloned()
                        .map(sql::ast::Expression::Value)
                        .collect(),
                }),
                Operator::Between => self.render(&Template::parse(
                    Operator::Between.default_template(),
                )?),
                operator => match self.values.as_slice() {
                    [value] => Ok(sql::ast::Expression::BinaryOperation {
                        left: Box::new(self.column.expression()),
                        operator: sql::ast::BinaryOperator(operator.symbol().to_string()),
                        right: Box::new(sql::ast::Expression::Value(value.clone())),
                    }),
                    values => Err(Error::ValueCountMismatch {
                        column: self.column.wire_name.clone(),
                        found: values.len(),
                    }),
                },
            },
        }
    }

    fn render(&self, template: &Template) -> Result<sql::ast::Expression, Error> {
        template.render(
            &self.column.wire_name,
            &self.column.expression(),
            &self.values,
        )
    }
}

/// Convert the values of a field for a column, applying a value format such as `{0}%` first.
pub fn translate_values(
    column: &ScopedColumn,
    values: &[serde_json::Value],
    value_format: Option<&str>,
) -> Result<Vec<sql::ast::Value>, Error> {
    values
        .iter()
        .map(|value| match value_format {
            Some(format) => Ok(sql::ast::Value::String(
                format.replace("{0}", &values::value_text(value)),
            )),
            None => values::translate_json_value(value, column.scalar_type),
        })
        .collect()
}

/// Whether a field value counts as set. Nulls and empty arrays do not.
pub fn is_set(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Array(values) => !values.is_empty(),
        _ => true,
    }
}

/// Resolve a declared field with a value.
/// Fields with a directive say how they are compared, others are resolved by naming convention.
pub fn resolve_field(
    scope: &Scope,
    term: QueryTerm,
    field: &FieldInfo,
    value: &serde_json::Value,
) -> Result<Option<PredicateTuple>, Error> {
    let Some(directive) = &field.directive else {
        return conventions::resolve_name(
            scope,
            term,
            &field.name,
            conventions::FieldValue::Json(value),
        );
    };

    let column = scope.expect_column(directive.field.as_deref().unwrap_or(&field.name))?;
    let template = directive
        .template
        .as_deref()
        .map(Template::parse)
        .transpose()?;
    let operator = match directive.operator {
        Some(operator) => operator,
        None if value.is_array() && template.is_none() => Operator::In,
        None => Operator::Equals,
    };
    let values = match value {
        serde_json::Value::Array(values) => values.clone(),
        value => vec![value.clone()],
    };

    Ok(Some(PredicateTuple {
        values: translate_values(&column, &values, directive.value_format.as_deref())?,
        column,
        operator,
        term: directive.term.unwrap_or(term),
        template,
    }))
}

/// Combine predicates into one condition.
///
/// Predicates with the descriptor's term form the main group. Predicates overriding it are
/// combined with the other term into a second group, which is then combined with the main
/// group by that other term. No predicates gives `true`.
pub fn build_predicate(
    term: QueryTerm,
    tuples: &[PredicateTuple],
) -> Result<sql::ast::Expression, Error> {
    let mut main = vec![];
    let mut overrides = vec![];
    for tuple in tuples {
        let expression = tuple.to_expression()?;
        if tuple.term == term {
            main.push(expression);
        } else {
            overrides.push(expression);
        }
    }

    let main = (!main.is_empty()).then(|| fold(term, main));
    let overrides = (!overrides.is_empty()).then(|| fold(other(term), overrides));
    Ok(match (main, overrides) {
        (None, None) => sql::helpers::true_expr(),
        (Some(group), None) | (None, Some(group)) => group,
        (Some(main), Some(overrides)) => combine(other(term), main, overrides),
    })
}

fn other(term: QueryTerm) -> QueryTerm {
    match term {
        QueryTerm::And => QueryTerm::Or,
        QueryTerm::Or => QueryTerm::And,
    }
}

fn fold(term: QueryTerm, expressions: Vec<sql::ast::Expression>) -> sql::ast::Expression {
    match term {
        QueryTerm::And => sql::helpers::and_all(expressions),
        QueryTerm::Or => sql::helpers::or_all(expressions),
    }
}

fn combine(
    term: QueryTerm,
    left: sql::ast::Expression,
    right: sql::ast::Expression,
) -> sql::ast::Expression {
    match term {
        QueryTerm::And => sql::helpers::and_expr(left, right),
        QueryTerm::Or => sql::helpers::or_expr(left, right),
    }
}
