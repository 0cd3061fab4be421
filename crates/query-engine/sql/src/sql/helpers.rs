//! Helpers for building sql::ast types in certain shapes and patterns.

use super::ast::*;

// Empty clauses //

/// An empty `WHERE` clause.
pub fn empty_where() -> Expression {
    Expression::Value(Value::Bool(true))
}

/// An empty `ORDER BY` clause.
pub fn empty_order_by() -> OrderBy {
    OrderBy {
        raw: None,
        elements: vec![],
    }
}

/// Empty `LIMIT` and `OFFSET` clauses.
pub fn empty_limit() -> Limit {
    Limit {
        limit: None,
        offset: None,
    }
}

/// A `true` expression.
pub fn true_expr() -> Expression {
    Expression::Value(Value::Bool(true))
}

// Predicates //

/// Combine two expressions with AND, dropping trivially true sides.
pub fn and_expr(left: Expression, right: Expression) -> Expression {
    if left == true_expr() {
        right
    } else if right == true_expr() {
        left
    } else {
        Expression::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// Combine two expressions with OR. Neither side may be the empty predicate.
pub fn or_expr(left: Expression, right: Expression) -> Expression {
    Expression::Or {
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// Fold expressions left to right with AND. No expressions means `true`.
pub fn and_all(expressions: impl IntoIterator<Item = Expression>) -> Expression {
    expressions
        .into_iter()
        .reduce(and_expr)
        .unwrap_or_else(true_expr)
}

/// Fold expressions left to right with OR. No expressions means `true`.
pub fn or_all(expressions: impl IntoIterator<Item = Expression>) -> Expression {
    expressions
        .into_iter()
        .reduce(or_expr)
        .unwrap_or_else(true_expr)
}

// Aliasing //

/// Create column aliases using this function so we build everything in one place.
pub fn make_column_alias(name: String) -> ColumnAlias {
    ColumnAlias { name }
}

/// Create table aliases using this function so we build everything in one place.
pub fn make_table_alias(name: String) -> TableAlias {
    TableAlias { name }
}

/// A reference to a database table.
pub fn db_table(schema: &str, table: &str) -> TableReference {
    TableReference::DBTable {
        schema: SchemaName(schema.to_string()),
        table: TableName(table.to_string()),
    }
}

// SELECTs //

/// Build a simple select with a select list and the rest are empty.
pub fn simple_select(select_list: Vec<(ColumnAlias, Expression)>) -> Select {
    Select {
        select_list: SelectList::SelectList(select_list),
        from: None,
        joins: vec![],
        where_: Where(empty_where()),
        order_by: empty_order_by(),
        limit: empty_limit(),
    }
}

/// Build a `SELECT COUNT(*)` over the same FROM, JOIN and WHERE clauses as `select`.
pub fn count_select(select: &Select) -> Select {
    select_over(
        select,
        vec![(
            make_column_alias("count".to_string()),
            Expression::Count(CountType::Star),
        )],
    )
}

/// Build a select with a new select list over the FROM, JOIN and WHERE clauses of `select`,
/// without its ordering or paging.
pub fn select_over(select: &Select, select_list: Vec<(ColumnAlias, Expression)>) -> Select {
    Select {
        select_list: SelectList::SelectList(select_list),
        from: select.from.clone(),
        joins: select.joins.clone(),
        where_: select.where_.clone(),
        order_by: empty_order_by(),
        limit: empty_limit(),
    }
}
