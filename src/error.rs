use thiserror::Error;

use crate::entity::tracked::Lifecycle;

/// Errors raised by the mapper. None of them are recovered internally, they propagate to the
/// caller unchanged.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no record with identity {id} in table \"{table}\"")]
    NotFound { table: &'static str, id: i64 },

    #[error("cannot {operation} a record in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: Lifecycle,
    },

    #[error("constraint violation: {0}")]
    ConstraintViolation(#[source] sqlx::Error),

    #[error("column \"{column}\" is not a field of \"{entity}\" or any of its ancestors")]
    MalformedCriteria { entity: &'static str, column: String },

    #[error("malformed entity model: {0}")]
    MalformedModel(String),

    #[error("\"{entity}\" has no field \"{field}\"")]
    UnknownField { entity: &'static str, field: String },

    #[error("field \"{field}\": expected {expected}, found {found}")]
    Decode {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("expected {expected} values, got {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Database(sqlx::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        let is_constraint = matches!(
            &value,
            sqlx::Error::Database(e) if !matches!(e.kind(), sqlx::error::ErrorKind::Other)
        );

        if is_constraint {
            Self::ConstraintViolation(value)
        } else {
            Self::Database(value)
        }
    }
}

impl Error {
    /// Attach a field name to a [`Error::Decode`] raised by a bare value conversion.
    #[must_use]
    pub fn for_field(self, name: &str) -> Self {
        match self {
            Self::Decode {
                expected, found, ..
            } => Self::Decode {
                field: name.to_string(),
                expected,
                found,
            },
            other => other,
        }
    }

    pub(crate) fn invalid_state(operation: &'static str, state: Lifecycle) -> Self {
        Self::InvalidState { operation, state }
    }
}
