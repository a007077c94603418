use std::fmt::{Display, Write};

use sqlx::{Row, Sqlite, TypeInfo, ValueRef, sqlite::SqliteRow};

use crate::error::{Error, Result};

/// A single column value as it travels between models and the database.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Render this value as an SQL literal: `NULL`, numbers as-is, text in single quotes with
    /// embedded quotes doubled, blobs as `X'..'`.
    ///
    /// Only used to render statements for diagnostics. Statements sent to the database always
    /// bind their values.
    #[must_use]
    pub fn to_sql_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Real(r) => r.to_string(),
            Self::Text(t) => format!("'{}'", t.replace('\'', "''")),
            Self::Blob(b) => {
                let mut out = String::with_capacity(b.len() * 2 + 3);
                out.push_str("X'");
                for byte in b {
                    let _ = write!(out, "{byte:02X}");
                }
                out.push('\'');
                out
            }
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        if let Self::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    /// Name of the storage class, used in decode errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Integer(_) => "INTEGER",
            Self::Real(_) => "REAL",
            Self::Text(_) => "TEXT",
            Self::Blob(_) => "BLOB",
        }
    }

    /// Push this value into a query builder as a bound parameter.
    pub(crate) fn push_bind(self, builder: &mut sqlx::QueryBuilder<'_, Sqlite>) {
        match self {
            Self::Null => builder.push_bind(None::<i64>),
            Self::Integer(i) => builder.push_bind(i),
            Self::Real(r) => builder.push_bind(r),
            Self::Text(t) => builder.push_bind(t),
            Self::Blob(b) => builder.push_bind(b),
        };
    }

    /// Read the column at `index`, decoding it by its runtime storage class.
    pub(crate) fn from_row(row: &SqliteRow, index: usize) -> Result<Self, sqlx::Error> {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(Self::Null);
        }

        let type_name = raw.type_info().name().to_ascii_uppercase();

        Ok(match type_name.as_str() {
            "INTEGER" | "INT" | "INT8" | "BIGINT" | "BOOLEAN" => Self::Integer(row.try_get(index)?),
            "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC" => Self::Real(row.try_get(index)?),
            "BLOB" => Self::Blob(row.try_get(index)?),
            _ => Self::Text(row.try_get(index)?),
        })
    }

    /// Read every column of a row in order.
    pub(crate) fn all_from_row(row: &SqliteRow) -> Result<Vec<Self>, sqlx::Error> {
        (0..row.len()).map(|i| Self::from_row(row, i)).collect()
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_sql_literal())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Self>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Conversion from a [`Value`] back into a model field type.
pub trait FromValue: Sized {
    /// # Errors
    ///
    /// [`Error::Decode`] if the value's storage class cannot represent `Self`. The field name is
    /// left empty, see [`Error::for_field`].
    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch<T>(expected: &'static str, found: &Value) -> Result<T> {
    Err(Error::Decode {
        field: String::new(),
        expected,
        found: found.kind().to_string(),
    })
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Integer(i) => Ok(i),
            other => mismatch("INTEGER", &other),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Integer(i) => Self::try_from(i).or_else(|_| mismatch("32-bit INTEGER", &value)),
            other => mismatch("INTEGER", &other),
        }
    }
}

impl FromValue for u32 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Integer(i) => Self::try_from(i).or_else(|_| mismatch("unsigned INTEGER", &value)),
            other => mismatch("INTEGER", &other),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Integer(i) => Ok(i != 0),
            other => mismatch("INTEGER (boolean)", &other),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Real(r) => Ok(r),
            #[allow(clippy::cast_precision_loss)]
            Value::Integer(i) => Ok(i as Self),
            other => mismatch("REAL", &other),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(t) => Ok(t),
            other => mismatch("TEXT", &other),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(b) => Ok(b),
            other => mismatch("BLOB", &other),
        }
    }
}

impl<T> FromValue for Option<T>
where
    T: FromValue,
{
    fn from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

/// Pull the next value for `field` out of an ordered value list. Used by derived models.
///
/// # Errors
///
/// [`Error::FieldCount`] when the list ran out, [`Error::Decode`] when the value does not convert.
pub fn next_field<T, I>(values: &mut I, field: &str, expected: usize, position: usize) -> Result<T>
where
    T: FromValue,
    I: Iterator<Item = Value>,
{
    let Some(value) = values.next() else {
        return Err(Error::FieldCount {
            expected,
            found: position,
        });
    };

    T::from_value(value).map_err(|e| e.for_field(field))
}
