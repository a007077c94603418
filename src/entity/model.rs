use crate::error::Result;

use super::value::Value;

/// The in-memory shape of an entity's record.
pub trait Model: Sized + Send + Sync + Unpin + 'static {
    /// Build a model from values ordered like the entity's
    /// [`fields`](super::EntityDescriptor::fields).
    ///
    /// # Errors
    ///
    /// If the number of values does not match or a value does not convert into its field's type.
    fn from_values(values: Vec<Value>) -> Result<Self>;

    /// The current value of a field, `None` if the model has no such field.
    fn value_of(&self, field: &str) -> Option<Value>;

    /// Overwrite a field from a dynamic value.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownField`](crate::Error::UnknownField) or
    /// [`Error::Decode`](crate::Error::Decode).
    fn assign(&mut self, field: &str, value: Value) -> Result<()>;
}
