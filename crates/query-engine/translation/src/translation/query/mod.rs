//! Translate a request against a query descriptor into an execution plan.

pub mod aggregates;
pub mod conventions;
pub mod fields;
pub mod filtering;
pub mod joins;
pub mod raw_sql;
pub mod references;
pub mod request;
pub mod sorting;
pub mod templates;
pub mod values;

use std::collections::HashMap;

use autoquery_configuration::QuerySettings;
use query_engine_metadata::metadata;
use query_engine_sql::sql;

use crate::translation::error::Error;
use crate::translation::helpers::{Env, Scope};
pub use aggregates::AggregateCommand;
pub use request::QueryRequest;

/// A translated query, open to adjustment before it is executed.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructedQuery {
    /// The name of the descriptor the query was constructed for.
    pub descriptor: String,
    pub plan: sql::execution_plan::ExecutionPlan,
    /// Aggregate commands that are not built in, left for response hooks.
    pub commands: Vec<AggregateCommand>,
    pub scope: Scope,
}

impl ConstructedQuery {
    /// Override the number of rows to return.
    pub fn set_take(&mut self, take: Option<u32>) {
        self.plan.paging.take = take;
    }

    /// Override the number of rows to skip.
    pub fn set_skip(&mut self, skip: Option<u32>) {
        self.plan.paging.skip = skip;
    }

    /// AND a condition with the query's WHERE clause.
    pub fn and_where(&mut self, condition: sql::ast::Expression) {
        let sql::ast::Where(current) = &self.plan.select.where_;
        self.plan.select.where_ =
            sql::ast::Where(sql::helpers::and_expr(current.clone(), condition));
    }

    /// A column in scope, as it is addressed in the query.
    pub fn column(&self, name: &str) -> Option<sql::ast::Expression> {
        self.scope
            .lookup_column(name)
            .map(|column| column.expression())
    }

    /// AND a comparison of a column in scope with a value, or with a list of values for `IN`.
    pub fn and_condition(
        &mut self,
        column: &str,
        operator: metadata::Operator,
        value: serde_json::Value,
    ) -> Result<(), Error> {
        let column = self.scope.expect_column(column)?;
        let values = match value {
            serde_json::Value::Array(values) => values,
            value => vec![value],
        };
        let tuple = filtering::PredicateTuple {
            values: filtering::translate_values(&column, &values, None)?,
            column,
            operator,
            term: metadata::QueryTerm::And,
            template: None,
        };
        self.and_where(tuple.to_expression()?);
        Ok(())
    }
}

/// The parts of a request after raw parameters are bound.
struct BoundRequest<'a> {
    fields: Vec<(&'a metadata::FieldInfo, serde_json::Value)>,
    free: Vec<(&'a str, &'a str)>,
    raw_sql: raw_sql::RawSqlFilters,
    skip: Option<u32>,
    take: Option<u32>,
    order_by: Option<&'a str>,
    order_by_desc: Option<&'a str>,
    include: Option<&'a str>,
}

/// Translate a request into a constructed query.
pub fn translate(
    metadata: &metadata::Metadata,
    settings: &QuerySettings,
    request: &QueryRequest,
) -> Result<ConstructedQuery, Error> {
    let env = Env::new(metadata, settings);
    let descriptor = env.lookup_descriptor(&request.descriptor)?;
    let scope = env.scope_for(descriptor)?;
    let bound = bind_request(&env, descriptor, request)?;

    // conditions
    let mut tuples = vec![];
    for (field, value) in &bound.fields {
        match filtering::resolve_field(&scope, descriptor.term, field, value)? {
            Some(tuple) => tuples.push(tuple),
            None => tracing::debug!("ignoring field '{}' of {}", field.name, request.descriptor),
        }
    }
    for (name, value) in &bound.free {
        let value = conventions::FieldValue::Raw(value);
        match conventions::resolve_name(&scope, descriptor.term, name, value)? {
            Some(tuple) => tuples.push(tuple),
            None => tracing::debug!("ignoring parameter '{name}' of {}", request.descriptor),
        }
    }
    let predicate = filtering::build_predicate(descriptor.term, &tuples)?;

    // select
    let (columns, mut shape) = fields::translate_fields(&env, &scope, descriptor)?;
    let mut select = sql::helpers::simple_select(columns);
    if matches!(&select.select_list, sql::ast::SelectList::SelectList(columns) if columns.is_empty())
    {
        select.select_list = sql::ast::SelectList::SelectStar;
    }
    select.from = Some(scope.primary().from_clause());
    select.joins = joins::translate_joins(&scope, descriptor)?;
    select.where_ = sql::ast::Where(predicate);
    select.order_by.elements =
        sorting::translate_order_by(&scope, bound.order_by, bound.order_by_desc);
    bound.raw_sql.apply(&mut select);

    // references are only loaded into rows of the entity's own shape
    let references = if descriptor.into.is_none() && bound.raw_sql.select.is_none() {
        let references = references::translate_references(&env, &scope)?;
        shape.extend(references.iter().map(|reference| reference.property.clone()));
        references
    } else {
        vec![]
    };

    // aggregates
    let mut builtins = vec![];
    let mut commands = vec![];
    for command in bound
        .include
        .map(aggregates::parse_commands)
        .unwrap_or_default()
    {
        match aggregates::translate_builtin(&scope, &command) {
            Some(expression) => builtins.push(sql::execution_plan::Aggregate {
                label: command.label(),
                expression,
            }),
            None => commands.push(command),
        }
    }

    let plan = sql::execution_plan::ExecutionPlan {
        root: descriptor.from.clone(),
        select,
        paging: sql::execution_plan::Paging {
            skip: bound.skip,
            take: bound.take,
            max_limit: settings.max_limit,
            default_order: scope
                .primary()
                .primary_key()
                .ok()
                .map(|column| column.expression()),
        },
        shape,
        aggregates: builtins,
        references,
    };

    tracing::debug!("translated {}: {:?}", request.descriptor, plan.select);

    Ok(ConstructedQuery {
        descriptor: request.descriptor.clone(),
        plan,
        commands,
        scope,
    })
}

/// Bind the raw parameters of a request.
///
/// Paging and `include` options fill the request's own options when those are unset. Raw SQL
/// fragments are only accepted when enabled. Empty values are unset. Declared fields are bound
/// unless the request already holds a typed value for them, lists split on commas. Everything
/// else is left to be resolved by naming convention.
fn bind_request<'a>(
    env: &Env,
    descriptor: &'a metadata::DescriptorInfo,
    request: &'a QueryRequest,
) -> Result<BoundRequest<'a>, Error> {
    let mut bound = BoundRequest {
        fields: vec![],
        free: vec![],
        raw_sql: raw_sql::RawSqlFilters::default(),
        skip: request.skip,
        take: request.take,
        order_by: request.order_by.as_deref(),
        order_by_desc: request.order_by_desc.as_deref(),
        include: request.include.as_deref(),
    };
    let mut raw_fields = HashMap::new();

    for (name, value) in &request.params {
        let paging = |current: Option<u32>| match current {
            Some(current) => Ok(Some(current)),
            None => value.trim().parse().map(Some).map_err(|_| Error::InvalidParameter {
                name: name.clone(),
                value: value.clone(),
            }),
        };
        match name.to_lowercase().as_str() {
            "skip" => bound.skip = paging(bound.skip)?,
            "take" => bound.take = paging(bound.take)?,
            "orderby" => bound.order_by = bound.order_by.or(Some(value.as_str())),
            "orderbydesc" => bound.order_by_desc = bound.order_by_desc.or(Some(value.as_str())),
            "include" => bound.include = bound.include.or(Some(value.as_str())),
            _ if env.settings.raw_sql_filter_names.contains(name) => {
                if !env.settings.enable_raw_sql_filters {
                    return Err(Error::RawSqlFiltersDisabled(name.clone()));
                }
                bound
                    .raw_sql
                    .insert(&env.settings.raw_sql_filter_names, name, value);
            }
            _ if value.trim().is_empty() => {
                tracing::debug!("ignoring empty parameter '{name}' of {}", request.descriptor);
            }
            _ => match descriptor.lookup_field(name) {
                Some(field) => {
                    let value = if field.r#type.is_array() {
                        serde_json::Value::Array(values::split_raw(value))
                    } else {
                        serde_json::Value::String(value.clone())
                    };
                    raw_fields.insert(field.name.as_str(), value);
                }
                None => bound.free.push((name.as_str(), value.as_str())),
            },
        }
    }

    for field in &descriptor.fields {
        let mut names = vec![field.name.as_str()];
        names.extend(field.alias.as_deref());
        let value = request
            .field_value(&names)
            .cloned()
            .or_else(|| raw_fields.remove(field.name.as_str()));
        if let Some(value) = value.filter(filtering::is_set) {
            bound.fields.push((field, value));
        }
    }

    Ok(bound)
}
