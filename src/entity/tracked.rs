use std::{fmt::Debug, ops::Deref};

use crate::error::{Error, Result};

use super::{Entity, column::Column, model::Model, value::Value};

/// Where a [`Tracked`] record stands relative to the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed in memory, never written.
    Unsaved,
    /// Backed by rows in the database.
    Persisted,
    /// Its leaf row has been removed.
    Deleted,
}

/// A model together with the writes made to it since it was last synchronised with the database.
///
/// Reading goes through [`Deref`] and never records anything. Every assignment through
/// [`set`](Self::set) or [`set_value`](Self::set_value) lands in the pending-write set; assigning
/// the same field twice keeps only the latest value, at the position of the first assignment.
pub struct Tracked<E>
where
    E: Entity,
{
    model: E::Model,
    changes: Vec<(&'static str, Value)>,
    state: Lifecycle,
}

impl<E> Tracked<E>
where
    E: Entity,
{
    /// Wrap a model that has not been written yet. Fields filled in by the constructor are not
    /// considered pending.
    pub const fn new(model: E::Model) -> Self {
        Self {
            model,
            changes: Vec::new(),
            state: Lifecycle::Unsaved,
        }
    }

    pub(crate) const fn persisted(model: E::Model) -> Self {
        Self {
            model,
            changes: Vec::new(),
            state: Lifecycle::Persisted,
        }
    }

    pub const fn state(&self) -> Lifecycle {
        self.state
    }

    pub const fn model(&self) -> &E::Model {
        &self.model
    }

    pub fn into_model(self) -> E::Model {
        self.model
    }

    /// The value of the entity's own identity field, if it is an integer.
    pub fn identity(&self) -> Option<i64> {
        self.model
            .value_of(E::descriptor().identity)
            .and_then(|v| v.as_integer())
    }

    /// The pending writes, in order of first assignment.
    pub fn changes(&self) -> &[(&'static str, Value)] {
        &self.changes
    }

    pub fn is_dirty(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn get<C>(&self) -> &C::Type
    where
        C: Column<Entity = E>,
    {
        C::get(&self.model)
    }

    /// Assign a field through its typed column marker.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] when the record was deleted, or when assigning an identity field of
    /// a persisted record.
    pub fn set<C>(&mut self, value: C::Type) -> Result<&mut Self>
    where
        C: Column<Entity = E>,
    {
        self.check_assignable(C::NAME)?;

        *C::get_mut(&mut self.model) = value.clone();
        self.record(C::NAME, value.into());

        Ok(self)
    }

    /// Assign a field by name.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownField`] if the entity has no such field, [`Error::Decode`] if the value
    /// does not fit the field, and the same state errors as [`set`](Self::set).
    pub fn set_value(&mut self, field: &str, value: impl Into<Value>) -> Result<&mut Self> {
        let descriptor = E::descriptor();
        let Some(name) = descriptor.fields.iter().copied().find(|f| *f == field) else {
            return Err(Error::UnknownField {
                entity: descriptor.table,
                field: field.to_string(),
            });
        };

        self.check_assignable(name)?;

        let value = value.into();
        self.model.assign(name, value.clone())?;
        self.record(name, value);

        Ok(self)
    }

    fn check_assignable(&self, field: &str) -> Result<()> {
        match self.state {
            Lifecycle::Deleted => Err(Error::invalid_state("modify", self.state)),
            Lifecycle::Persisted
                if E::descriptor()
                    .lineage()
                    .any(|entity| entity.identity == field) =>
            {
                Err(Error::invalid_state("reassign the identity of", self.state))
            }
            _ => Ok(()),
        }
    }

    fn record(&mut self, name: &'static str, value: Value) {
        if let Some(entry) = self.changes.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.changes.push((name, value));
        }
    }

    /// Overwrite a field without recording it, used for values the database assigned.
    pub(crate) fn assign_untracked(&mut self, field: &str, value: Value) -> Result<()> {
        self.model.assign(field, value)
    }

    pub(crate) fn clear_changes(&mut self) {
        self.changes.clear();
    }

    pub(crate) const fn mark(&mut self, state: Lifecycle) {
        self.state = state;
    }
}

impl<E> Deref for Tracked<E>
where
    E: Entity,
{
    type Target = E::Model;

    fn deref(&self) -> &Self::Target {
        &self.model
    }
}

impl<E> Clone for Tracked<E>
where
    E: Entity,
    E::Model: Clone,
{
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            changes: self.changes.clone(),
            state: self.state,
        }
    }
}

impl<E> Debug for Tracked<E>
where
    E: Entity,
    E::Model: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracked")
            .field("model", &self.model)
            .field("changes", &self.changes)
            .field("state", &self.state)
            .finish()
    }
}
