//! Describe the execution of a query: the main rows query, and the count, aggregate and
//! reference queries derived from it.

use super::ast;
use super::helpers;
use super::string;

/// Everything the execution phase needs to run one constructed query.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan {
    /// The name of the entity we query, for logging.
    pub root: String,
    /// Select list, FROM, JOINs, WHERE and explicit ordering. Limits are applied from `paging`.
    pub select: ast::Select,
    pub paging: Paging,
    /// The properties of a result row, in order.
    pub shape: Vec<String>,
    /// Built-in aggregates, computed by one secondary query over the same scope.
    pub aggregates: Vec<Aggregate>,
    /// Reference collections loaded after the main query.
    pub references: Vec<ReferenceLoad>,
}

/// Requested paging and the limits that constrain it.
#[derive(Debug, Clone, PartialEq)]
pub struct Paging {
    pub skip: Option<u32>,
    pub take: Option<u32>,
    /// The ceiling applied to `take`, and the implicit limit when `take` is absent.
    pub max_limit: Option<u32>,
    /// Ordering used for stable pages when the caller supplies none.
    pub default_order: Option<ast::Expression>,
}

/// A built-in aggregate and the label its value is reported under.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub label: String,
    pub expression: ast::Expression,
}

/// Load the rows of a reference collection for a batch of parent rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLoad {
    /// The property of the parent row the collection is written to.
    pub property: String,
    /// The property of the parent row holding its key.
    pub key_property: String,
    /// Selects the referenced rows, ordered. The WHERE clause is filled in per batch.
    pub select: ast::Select,
    /// The referencing column compared against the parent keys.
    pub foreign_key: ast::Expression,
    /// The property of a referenced row holding the parent key.
    pub foreign_key_property: String,
    /// The properties of a referenced row, in order.
    pub shape: Vec<String>,
}

impl ExecutionPlan {
    /// The number of rows skipped.
    pub fn offset(&self) -> u32 {
        self.paging.skip.unwrap_or(0)
    }

    /// The effective limit: `take` clamped to the maximum, or the maximum itself.
    pub fn limit(&self) -> Option<u32> {
        match self.paging.take {
            Some(take) => Some(self.paging.max_limit.map_or(take, |max| take.min(max))),
            None => self.paging.max_limit,
        }
    }

    /// Whether the returned rows may not be all the rows in scope, so that
    /// a separate count is required to report the total.
    pub fn needs_count(&self, returned: usize) -> bool {
        self.offset() > 0
            || self
                .limit()
                .is_some_and(|limit| returned >= usize::try_from(limit).unwrap_or(usize::MAX))
    }

    /// The rows query, with paging applied.
    pub fn rows_select(&self) -> ast::Select {
        let mut select = self.select.clone();
        let paged = self.paging.skip.is_some() || self.paging.take.is_some();
        let unordered = select.order_by.raw.is_none() && select.order_by.elements.is_empty();
        if paged && unordered {
            if let Some(target) = &self.paging.default_order {
                select.order_by.elements.push(ast::OrderByElement {
                    target: target.clone(),
                    direction: ast::OrderByDirection::Asc,
                });
            }
        }
        select.limit = ast::Limit {
            limit: self.limit(),
            offset: self.paging.skip.filter(|skip| *skip > 0),
        };
        select
    }

    /// Render the rows query.
    pub fn query_sql(&self) -> string::SQL {
        let mut sql = string::SQL::new();
        self.rows_select().to_sql(&mut sql);
        sql
    }

    /// Render the unpaged count over the same scope.
    pub fn count_sql(&self) -> string::SQL {
        let mut sql = string::SQL::new();
        helpers::count_select(&self.select).to_sql(&mut sql);
        sql
    }

    /// Render the query computing every built-in aggregate, if there are any.
    /// Column `i` of its single row holds the value of `aggregates[i]`.
    pub fn aggregates_sql(&self) -> Option<string::SQL> {
        if self.aggregates.is_empty() {
            return None;
        }
        let select_list = self
            .aggregates
            .iter()
            .enumerate()
            .map(|(index, aggregate)| {
                (
                    helpers::make_column_alias(format!("aggregate_{index}")),
                    aggregate.expression.clone(),
                )
            })
            .collect();
        let mut sql = string::SQL::new();
        helpers::select_over(&self.select, select_list).to_sql(&mut sql);
        Some(sql)
    }
}

impl ReferenceLoad {
    /// Render the query loading the referenced rows of the given parent keys.
    pub fn query_sql(&self, keys: Vec<ast::Value>) -> string::SQL {
        let mut select = self.select.clone();
        select.where_ = ast::Where(ast::Expression::BinaryArrayOperation {
            left: Box::new(self.foreign_key.clone()),
            operator: ast::BinaryArrayOperator::In,
            right: keys.into_iter().map(ast::Expression::Value).collect(),
        });
        let mut sql = string::SQL::new();
        select.to_sql(&mut sql);
        sql
    }
}
