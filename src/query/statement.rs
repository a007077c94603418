use futures::TryStreamExt;
use sqlx::{
    QueryBuilder, Sqlite, SqliteConnection,
    sqlite::{SqliteQueryResult, SqliteRow},
};
use tracing::debug;

use crate::{entity::value::Value, error::Result};

use super::{
    ColumnEquals, ColumnName, PushToQuery, QueryVariable, TableName, push_separated,
    render_separated,
};

/// `SELECT "a", "b" FROM "table" WHERE "column" = ? [ORDER BY "c"]`
#[derive(Debug, Clone)]
pub struct Select {
    table: &'static str,
    columns: Vec<ColumnName>,
    condition: ColumnEquals,
    order_by: Option<ColumnName>,
}

impl Select {
    #[must_use]
    pub fn new(table: &'static str, columns: &[&'static str], condition: ColumnEquals) -> Self {
        Self {
            table,
            columns: columns.iter().copied().map(ColumnName::new).collect(),
            condition,
            order_by: None,
        }
    }

    #[must_use]
    pub fn ordered_by(mut self, column: &'static str) -> Self {
        self.order_by = Some(ColumnName::new(column));
        self
    }
}

impl PushToQuery for Select {
    fn push_to(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        builder.push("SELECT ");
        push_separated(builder, &self.columns, ", ");
        builder.push(format_args!(" FROM {} WHERE ", TableName(self.table)));
        self.condition.push_to(builder);
        if let Some(column) = &self.order_by {
            builder.push(format_args!(" ORDER BY {column}"));
        }
    }

    fn render(&self) -> String {
        let mut sql = format!(
            "SELECT {} FROM {} WHERE {}",
            render_separated(&self.columns, ", "),
            TableName(self.table),
            self.condition.render()
        );
        if let Some(column) = &self.order_by {
            sql.push_str(&format!(" ORDER BY {column}"));
        }
        sql
    }
}

/// `INSERT INTO "table" ("a", "b") VALUES (?, ?)`
#[derive(Debug, Clone)]
pub struct Insert {
    table: &'static str,
    columns: Vec<ColumnName>,
    values: Vec<QueryVariable>,
}

impl Insert {
    #[must_use]
    pub fn new(table: &'static str, row: Vec<(&'static str, Value)>) -> Self {
        let (columns, values) = row
            .into_iter()
            .map(|(name, value)| (ColumnName::new(name), QueryVariable(value)))
            .unzip();

        Self {
            table,
            columns,
            values,
        }
    }
}

impl PushToQuery for Insert {
    fn push_to(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        builder.push(format_args!("INSERT INTO {}", TableName(self.table)));
        if self.columns.is_empty() {
            builder.push(" DEFAULT VALUES");
            return;
        }
        builder.push(" (");
        push_separated(builder, &self.columns, ", ");
        builder.push(") VALUES (");
        push_separated(builder, &self.values, ", ");
        builder.push(")");
    }

    fn render(&self) -> String {
        if self.columns.is_empty() {
            return format!("INSERT INTO {} DEFAULT VALUES", TableName(self.table));
        }
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            TableName(self.table),
            render_separated(&self.columns, ", "),
            render_separated(&self.values, ", ")
        )
    }
}

/// `UPDATE "table" SET "a" = ?, "b" = ? WHERE "identity" = ?`
#[derive(Debug, Clone)]
pub struct Update {
    table: &'static str,
    assignments: Vec<ColumnEquals>,
    condition: ColumnEquals,
}

impl Update {
    #[must_use]
    pub fn new(
        table: &'static str,
        assignments: Vec<(&'static str, Value)>,
        condition: ColumnEquals,
    ) -> Self {
        Self {
            table,
            assignments: assignments
                .into_iter()
                .map(|(name, value)| ColumnEquals::matching(name, value))
                .collect(),
            condition,
        }
    }
}

impl PushToQuery for Update {
    fn push_to(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        builder.push(format_args!("UPDATE {} SET ", TableName(self.table)));
        push_separated(builder, &self.assignments, ", ");
        builder.push(" WHERE ");
        self.condition.push_to(builder);
    }

    fn render(&self) -> String {
        format!(
            "UPDATE {} SET {} WHERE {}",
            TableName(self.table),
            render_separated(&self.assignments, ", "),
            self.condition.render()
        )
    }
}

/// `DELETE FROM "table" WHERE "identity" = ?`
#[derive(Debug, Clone)]
pub struct Delete {
    table: &'static str,
    condition: ColumnEquals,
}

impl Delete {
    #[must_use]
    pub const fn new(table: &'static str, condition: ColumnEquals) -> Self {
        Self { table, condition }
    }
}

impl PushToQuery for Delete {
    fn push_to(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        builder.push(format_args!("DELETE FROM {} WHERE ", TableName(self.table)));
        self.condition.push_to(builder);
    }

    fn render(&self) -> String {
        format!(
            "DELETE FROM {} WHERE {}",
            TableName(self.table),
            self.condition.render()
        )
    }
}

/// Return the raw SQL of a statement, with `?` in place of every bound value.
///
/// This is mainly useful for debugging purposes.
#[must_use]
pub fn query<Q>(statement: &Q) -> String
where
    Q: PushToQuery,
{
    let mut builder = QueryBuilder::new("");
    statement.push_to(&mut builder);
    builder.into_sql()
}

/// Execute a statement that returns no rows.
///
/// # Errors
///
/// See [`Error`](crate::Error): constraint violations are told apart from other database errors.
pub async fn execute<Q>(
    connection: &mut SqliteConnection,
    statement: &Q,
) -> Result<SqliteQueryResult>
where
    Q: PushToQuery,
{
    debug!(statement = %statement.render(), "executing");

    let mut builder = QueryBuilder::new("");
    statement.push_to(&mut builder);

    Ok(builder.build().execute(&mut *connection).await?)
}

/// Execute a query, returning every row as a list of values in column order.
///
/// # Errors
///
/// If there's been a problem communicating with the database or a column could not be decoded.
pub async fn fetch_all<Q>(
    connection: &mut SqliteConnection,
    statement: &Q,
) -> Result<Vec<Vec<Value>>>
where
    Q: PushToQuery,
{
    debug!(statement = %statement.render(), "fetching");

    let mut builder = QueryBuilder::new("");
    statement.push_to(&mut builder);

    let rows = builder
        .build()
        .fetch(&mut *connection)
        .try_collect::<Vec<SqliteRow>>()
        .await?;

    Ok(rows
        .iter()
        .map(Value::all_from_row)
        .collect::<Result<Vec<_>, _>>()?)
}
