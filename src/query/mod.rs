pub mod statement;

use std::fmt::Display;

use sqlx::{QueryBuilder, Sqlite};

use crate::entity::value::Value;

/// This trait represents anything that can be pushed into a [`QueryBuilder`], i.e. any kind of
/// query fragment, like a condition or a list of values.
pub trait PushToQuery {
    /// Push the object's contents into a query builder.
    fn push_to(&self, builder: &mut QueryBuilder<'_, Sqlite>);

    /// Render the fragment with every bound value inlined as an SQL literal. Meant for logs only,
    /// never for execution.
    fn render(&self) -> String;
}

/// A quoted column identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnName(pub &'static str);

impl ColumnName {
    #[must_use]
    pub const fn new(column_name: &'static str) -> Self {
        Self(column_name)
    }
}

impl Display for ColumnName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

impl PushToQuery for ColumnName {
    fn push_to(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        builder.push(self.to_string());
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

/// A quoted table name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableName(pub &'static str);

impl Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

/// A value that is sent as a bound parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryVariable(pub Value);

impl PushToQuery for QueryVariable {
    fn push_to(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        self.0.clone().push_bind(builder);
    }

    fn render(&self) -> String {
        self.0.to_sql_literal()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryExprOperand {
    Equals,
}

impl Display for BinaryExprOperand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Equals => "=",
            }
        )
    }
}

/// `left <operand> right`, e.g. `"email" = ?` in a `WHERE` or `SET` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr<T, C>
where
    T: PushToQuery,
    C: PushToQuery,
{
    a: T,
    b: C,
    operand: BinaryExprOperand,
}

impl<T, C> BinaryExpr<T, C>
where
    T: PushToQuery,
    C: PushToQuery,
{
    pub(crate) const fn new(left: T, right: C, operand: BinaryExprOperand) -> Self {
        Self {
            a: left,
            b: right,
            operand,
        }
    }
}

impl<T, C> PushToQuery for BinaryExpr<T, C>
where
    T: PushToQuery,
    C: PushToQuery,
{
    fn push_to(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        self.a.push_to(builder);
        builder.push(format_args!(" {} ", self.operand));
        self.b.push_to(builder);
    }

    fn render(&self) -> String {
        format!("{} {} {}", self.a.render(), self.operand, self.b.render())
    }
}

/// `column = ?`, the only kind of condition the mapper ever issues.
pub type ColumnEquals = BinaryExpr<ColumnName, QueryVariable>;

impl ColumnEquals {
    #[must_use]
    pub fn matching(column: &'static str, value: Value) -> Self {
        Self::new(
            ColumnName::new(column),
            QueryVariable(value),
            BinaryExprOperand::Equals,
        )
    }
}

/// Push `items` separated by `separator`.
pub(crate) fn push_separated<T>(
    builder: &mut QueryBuilder<'_, Sqlite>,
    items: &[T],
    separator: &str,
) where
    T: PushToQuery,
{
    items.iter().enumerate().for_each(|(i, e)| {
        if i > 0 {
            builder.push(separator);
        }
        e.push_to(builder);
    });
}

pub(crate) fn render_separated<T>(items: &[T], separator: &str) -> String
where
    T: PushToQuery,
{
    items
        .iter()
        .map(PushToQuery::render)
        .collect::<Vec<_>>()
        .join(separator)
}
