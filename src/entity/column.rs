use super::{
    Entity,
    value::{FromValue, Value},
};

/// A typed handle on one field of an entity. Generated by
/// [`DatabaseModel`](crate::DatabaseModel) inside the model's `columns` module.
pub trait Column {
    /// The underlying rust type of this column.
    type Type: Into<Value> + FromValue + Clone;

    /// The entity that this column belongs to.
    type Entity: Entity;

    /// The name this column has in the database.
    const NAME: &'static str;

    fn get(model: &<Self::Entity as Entity>::Model) -> &Self::Type;

    fn get_mut(model: &mut <Self::Entity as Entity>::Model) -> &mut Self::Type;
}
