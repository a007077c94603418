use itertools::Itertools;

use crate::error::{Error, Result};

use super::{EntityDescriptor, value::Value};

/// Upper bound on chain length, anything deeper is treated as a cycle.
pub(crate) const MAX_DEPTH: usize = 64;

/// The fields one table of an inheritance chain owns, i.e. declares for the first time.
#[derive(Debug, Clone)]
pub struct OwnedFields {
    pub entity: &'static EntityDescriptor,
    pub fields: Vec<&'static str>,
}

/// Field ownership for an entity type and all of its ancestors.
///
/// Built once per entity type; every operation of a
/// [`Repository`](crate::repository::Repository) consults it to know which table stores which
/// field.
#[derive(Debug, Clone)]
pub struct InheritanceTree {
    leaf: &'static EntityDescriptor,
    /// Eldest first.
    ancestors: Vec<OwnedFields>,
    unique: Vec<&'static str>,
}

impl InheritanceTree {
    /// Walk the ancestor chain of `leaf` from the most distant ancestor to the nearest, recording
    /// for each ancestor the fields not present in the ancestor before it. Whatever the leaf
    /// declares beyond its nearest ancestor is unique to the leaf.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedModel`] if the chain loops, a descriptor repeats a column, a descendant
    /// drops a field of its parent, or an identity field is not owned by its own type.
    pub fn build(leaf: &'static EntityDescriptor) -> Result<Self> {
        check_distinct(leaf)?;

        let mut chain = Vec::new();
        let mut cursor = leaf.parent();
        while let Some(ancestor) = cursor {
            if ancestor == leaf || chain.contains(&ancestor) || chain.len() >= MAX_DEPTH {
                return Err(Error::MalformedModel(format!(
                    "inheritance chain of \"{}\" loops through \"{}\"",
                    leaf.table, ancestor.table
                )));
            }
            check_distinct(ancestor)?;
            chain.push(ancestor);
            cursor = ancestor.parent();
        }
        chain.reverse();

        let mut ancestors: Vec<OwnedFields> = Vec::with_capacity(chain.len());
        let mut parent_fields: &[&'static str] = &[];

        for ancestor in chain {
            check_superset(ancestor, parent_fields)?;

            let fields = ancestor
                .fields
                .iter()
                .copied()
                .filter(|f| !parent_fields.contains(f))
                .collect::<Vec<_>>();

            if !fields.contains(&ancestor.identity) {
                return Err(Error::MalformedModel(format!(
                    "identity \"{}\" of \"{}\" is not a field it declares",
                    ancestor.identity, ancestor.table
                )));
            }

            ancestors.push(OwnedFields {
                entity: ancestor,
                fields,
            });
            parent_fields = ancestor.fields;
        }

        check_superset(leaf, parent_fields)?;

        let unique = leaf
            .fields
            .iter()
            .copied()
            .filter(|f| !ancestors.iter().any(|a| a.fields.contains(f)))
            .collect::<Vec<_>>();

        if !unique.contains(&leaf.identity) {
            return Err(Error::MalformedModel(format!(
                "identity \"{}\" of \"{}\" is not a field it declares",
                leaf.identity, leaf.table
            )));
        }

        Ok(Self {
            leaf,
            ancestors,
            unique,
        })
    }

    #[must_use]
    pub const fn leaf(&self) -> &'static EntityDescriptor {
        self.leaf
    }

    /// Ancestors and the fields each of them owns, eldest first. Empty for a type without a
    /// persisted parent.
    #[must_use]
    pub fn ancestors(&self) -> &[OwnedFields] {
        &self.ancestors
    }

    /// The fields stored in the leaf's own table.
    #[must_use]
    pub fn unique_fields(&self) -> &[&'static str] {
        &self.unique
    }

    /// Every table of the chain with the fields it owns, eldest first and the leaf last.
    pub fn tables(
        &self,
    ) -> impl DoubleEndedIterator<Item = (&'static EntityDescriptor, &[&'static str])> {
        self.ancestors
            .iter()
            .map(|a| (a.entity, a.fields.as_slice()))
            .chain(std::iter::once((self.leaf, self.unique.as_slice())))
    }

    /// The type that first declares `field`, or `None` if neither the leaf nor any ancestor has
    /// such a field.
    #[must_use]
    pub fn owner_of(&self, field: &str) -> Option<&'static EntityDescriptor> {
        self.tables()
            .find(|(_, fields)| fields.contains(&field))
            .map(|(entity, _)| entity)
    }

    /// Resolve a caller-supplied column name to the static name stored in the descriptor.
    #[must_use]
    pub fn resolve(&self, field: &str) -> Option<(&'static EntityDescriptor, &'static str)> {
        self.tables().find_map(|(entity, fields)| {
            fields
                .iter()
                .find(|f| **f == field)
                .map(|f| (entity, *f))
        })
    }

    /// Whether `field` is the identity column of any table in the chain.
    #[must_use]
    pub fn is_identity(&self, field: &str) -> bool {
        self.tables().any(|(entity, _)| entity.identity == field)
    }

    /// Split a change set into one group per owning table, in chain order. Tables without any
    /// change are left out, fields nobody owns are dropped.
    #[must_use]
    pub fn partition<'c>(
        &self,
        changes: &'c [(&'static str, Value)],
    ) -> Vec<(&'static EntityDescriptor, Vec<&'c (&'static str, Value)>)> {
        self.tables()
            .map(|(entity, fields)| {
                (
                    entity,
                    changes
                        .iter()
                        .filter(|(name, _)| fields.contains(name))
                        .collect::<Vec<_>>(),
                )
            })
            .filter(|(_, changes)| !changes.is_empty())
            .collect()
    }
}

fn check_distinct(entity: &EntityDescriptor) -> Result<()> {
    if let Some(duplicate) = entity.fields.iter().duplicates().next() {
        return Err(Error::MalformedModel(format!(
            "\"{}\" declares column \"{duplicate}\" more than once",
            entity.table
        )));
    }
    Ok(())
}

fn check_superset(entity: &EntityDescriptor, parent_fields: &[&'static str]) -> Result<()> {
    if let Some(missing) = parent_fields.iter().find(|f| !entity.has_field(f)) {
        return Err(Error::MalformedModel(format!(
            "\"{}\" does not carry inherited field \"{missing}\"",
            entity.table
        )));
    }
    Ok(())
}
