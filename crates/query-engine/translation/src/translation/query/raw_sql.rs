//! Raw SQL fragments callers may pass when the engine allows it.

use autoquery_configuration::RawSqlFilterNames;
use query_engine_sql::sql;

/// The raw SQL fragments of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSqlFilters {
    pub r#where: Option<String>,
    pub select: Option<String>,
    pub from: Option<String>,
    pub join: Option<String>,
    pub order_by: Option<String>,
}

impl RawSqlFilters {
    /// Record a fragment under the slot its parameter name refers to, ignoring case.
    /// Returns false when the name is not a raw SQL parameter.
    pub fn insert(&mut self, names: &RawSqlFilterNames, name: &str, value: &str) -> bool {
        let slot = if names.r#where.eq_ignore_ascii_case(name) {
            &mut self.r#where
        } else if names.select.eq_ignore_ascii_case(name) {
            &mut self.select
        } else if names.from.eq_ignore_ascii_case(name) {
            &mut self.from
        } else if names.join.eq_ignore_ascii_case(name) {
            &mut self.join
        } else if names.order_by.eq_ignore_ascii_case(name) {
            &mut self.order_by
        } else {
            return false;
        };
        *slot = Some(value.to_string());
        true
    }

    /// Apply the fragments to a select. The WHERE fragment is ANDed with the existing
    /// condition, the JOIN fragment is appended after the declared joins.
    pub fn apply(&self, select: &mut sql::ast::Select) {
        if let Some(select_list) = &self.select {
            select.select_list = sql::ast::SelectList::Raw(select_list.clone());
        }
        if let Some(from) = &self.from {
            select.from = Some(sql::ast::From::Raw(from.clone()));
        }
        if let Some(join) = &self.join {
            select.joins.push(sql::ast::Join::Raw(join.clone()));
        }
        if let Some(where_) = &self.r#where {
            let sql::ast::Where(current) = &select.where_;
            select.where_ = sql::ast::Where(sql::helpers::and_expr(
                current.clone(),
                sql::ast::Expression::RawSql(vec![sql::ast::RawSql::RawText(where_.clone())]),
            ));
        }
        if let Some(order_by) = &self.order_by {
            select.order_by.raw = Some(order_by.clone());
        }
    }
}
