//! The SQL statements a query descriptor translates into.
//!
//! Only the subset of SQLite the engine emits is modelled. Clauses a caller may supply as raw
//! text carry a `Raw` variant which is rendered verbatim.

/// Template output: trusted text interleaved with expressions rendered as usual.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSql {
    RawText(String),
    Expression(Expression),
}

/// A SELECT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub select_list: SelectList,
    pub from: Option<From>,
    pub joins: Vec<Join>,
    pub where_: Where,
    pub order_by: OrderBy,
    pub limit: Limit,
}

/// What a SELECT returns.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectList {
    /// Aliased expressions, in result order.
    SelectList(Vec<(ColumnAlias, Expression)>),
    /// `*`, used when a descriptor's result shape has no columns of the queried entity.
    SelectStar,
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum From {
    Table {
        reference: TableReference,
        alias: TableAlias,
    },
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Join {
    InnerJoin(InnerJoin),
    LeftOuterJoin(LeftOuterJoin),
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InnerJoin {
    pub reference: TableReference,
    pub alias: TableAlias,
    pub on: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeftOuterJoin {
    pub reference: TableReference,
    pub alias: TableAlias,
    pub on: Expression,
}

/// The filter of a statement. A `true` condition renders no WHERE clause at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Where(pub Expression);

/// Ordering: an optional caller supplied prefix followed by resolved columns.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub raw: Option<String>,
    pub elements: Vec<OrderByElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByElement {
    pub target: Expression,
    pub direction: OrderByDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderByDirection {
    Asc,
    Desc,
}

impl OrderByDirection {
    /// The opposite direction.
    pub fn flip(self) -> Self {
        match self {
            OrderByDirection::Asc => OrderByDirection::Desc,
            OrderByDirection::Desc => OrderByDirection::Asc,
        }
    }
}

/// Paging. An offset without a limit is still rendered, sqlite needs a limit for that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limit {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// A scalar or boolean expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    And {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Or {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// `left <operator> right`, for the comparison operators of a query field.
    BinaryOperation {
        left: Box<Expression>,
        operator: BinaryOperator,
        right: Box<Expression>,
    },
    /// `left IN (right, ...)`.
    BinaryArrayOperation {
        left: Box<Expression>,
        operator: BinaryArrayOperator,
        right: Vec<Expression>,
    },
    /// One of the built-in aggregates over a column.
    FunctionCall {
        function: Function,
        args: Vec<Expression>,
    },
    Count(CountType),
    ColumnReference(ColumnReference),
    /// A literal. Everything but booleans and NULL is bound as a parameter.
    Value(Value),
    RawSql(Vec<RawSql>),
}

/// The symbol of a comparison, like `>=` or `LIKE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryOperator(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryArrayOperator {
    In,
}

/// The built-in aggregates other than COUNT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Min,
    Max,
    Sum,
    Avg,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountType {
    /// `COUNT(*)`
    Star,
    /// `COUNT(column)`
    Simple(ColumnReference),
    /// `COUNT(DISTINCT column)`
    Distinct(ColumnReference),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int8(i64),
    Float8(f64),
    Bool(bool),
    String(String),
    Null,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaName(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(pub String);

/// A table as it is named in a FROM or JOIN clause, or by the alias given to it there.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TableReference {
    DBTable {
        schema: SchemaName,
        table: TableName,
    },
    AliasedTable(TableAlias),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnName(pub String);

/// A column of a table in scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnReference {
    TableColumn {
        table: TableReference,
        name: ColumnName,
    },
}

/// Tables are aliased by the name of the entity they hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableAlias {
    pub name: String,
}

/// The name a result column is returned under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnAlias {
    pub name: String,
}
