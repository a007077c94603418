pub mod column;
pub mod inheritance;
pub mod model;
pub mod tracked;
pub mod value;

use model::Model;

/// Static description of one persisted entity type.
///
/// `fields` lists every column the type persists in declaration order, including the ones it
/// inherits. Which table actually stores a field is decided by
/// [`InheritanceTree`](inheritance::InheritanceTree).
#[derive(Debug)]
pub struct EntityDescriptor {
    /// The name of this entity's table in the database.
    pub table: &'static str,

    /// The identity column, assigned by the database on creation.
    pub identity: &'static str,

    pub fields: &'static [&'static str],

    /// The entity type this one extends, if any.
    pub parent: Option<fn() -> &'static EntityDescriptor>,
}

impl EntityDescriptor {
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains(&name)
    }

    #[must_use]
    pub fn parent(&self) -> Option<&'static Self> {
        self.parent.map(|f| f())
    }

    /// This descriptor followed by its parent, grandparent and so on.
    pub fn lineage(&'static self) -> impl Iterator<Item = &'static Self> {
        std::iter::successors(Some(self), |d| d.parent()).take(inheritance::MAX_DEPTH + 1)
    }
}

impl PartialEq for EntityDescriptor {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || self.table == other.table
    }
}

impl Eq for EntityDescriptor {}

/// An entity type bound to a table. Usually implemented through
/// [`DatabaseModel`](crate::DatabaseModel) on a marker struct named `Entity`.
pub trait Entity: Sized + Send + Sync + 'static {
    type Model: Model;

    fn descriptor() -> &'static EntityDescriptor;
}
