use std::marker::PhantomData;

use sqlx::{Connection, SqliteConnection};
use tracing::{debug, warn};

use crate::{
    entity::{
        Entity, EntityDescriptor,
        inheritance::InheritanceTree,
        model::Model,
        tracked::{Lifecycle, Tracked},
        value::Value,
    },
    error::{Error, Result},
    query::{
        ColumnEquals,
        statement::{Delete, Insert, Select, Update, execute, fetch_all},
    },
};

/// Persistence adapter for one entity type.
///
/// Build it once with [`Repository::new`], which computes the field ownership of the whole
/// inheritance chain, then pass a connection (or an open transaction) into every call.
pub struct Repository<E>
where
    E: Entity,
{
    tree: InheritanceTree,
    marker: PhantomData<E>,
}

impl<E> Repository<E>
where
    E: Entity,
{
    /// # Errors
    ///
    /// [`Error::MalformedModel`] if the entity's inheritance chain is inconsistent.
    pub fn new() -> Result<Self> {
        Ok(Self {
            tree: InheritanceTree::build(E::descriptor())?,
            marker: PhantomData,
        })
    }

    #[must_use]
    pub const fn tree(&self) -> &InheritanceTree {
        &self.tree
    }

    fn leaf(&self) -> &'static EntityDescriptor {
        self.tree.leaf()
    }

    /// Whether this type's own table holds a record with the given identity. Ancestor tables are
    /// not consulted.
    ///
    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn has(&self, connection: &mut SqliteConnection, id: i64) -> Result<bool> {
        let leaf = self.leaf();
        let rows = fetch_all(
            connection,
            &Select::new(
                leaf.table,
                &[leaf.identity],
                ColumnEquals::matching(leaf.identity, Value::Integer(id)),
            ),
        )
        .await?;

        Ok(!rows.is_empty())
    }

    /// Whether [`fetch_where`](Self::fetch_where) would return anything.
    ///
    /// A column that is neither declared by this type nor by one of its ancestors yields `false`
    /// rather than an error.
    ///
    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn has_where(
        &self,
        connection: &mut SqliteConnection,
        column: &str,
        value: impl Into<Value>,
    ) -> Result<bool> {
        match self.matching_ids(connection, column, value.into()).await {
            Ok(ids) => Ok(!ids.is_empty()),
            Err(Error::MalformedCriteria { entity, column }) => {
                warn!(entity, %column, "has_where on an unknown column");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Load the record with the given identity, reading the leaf row and then every ancestor's
    /// row for the same identity.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the leaf table, or one of the ancestor tables, has no such row.
    pub async fn fetch(&self, connection: &mut SqliteConnection, id: i64) -> Result<Tracked<E>> {
        let mut columns = std::collections::HashMap::new();

        for (entity, fields) in self.tree.tables().rev() {
            let mut rows = fetch_all(
                connection,
                &Select::new(
                    entity.table,
                    fields,
                    ColumnEquals::matching(entity.identity, Value::Integer(id)),
                ),
            )
            .await?;

            let Some(row) = rows.pop() else {
                return Err(Error::NotFound {
                    table: entity.table,
                    id,
                });
            };

            columns.extend(fields.iter().copied().zip(row));
        }

        let values = self
            .leaf()
            .fields
            .iter()
            .map(|f| columns.remove(f).unwrap_or(Value::Null))
            .collect();

        Ok(Tracked::persisted(E::Model::from_values(values)?))
    }

    /// Load every record whose `column` equals `value`, in identity order.
    ///
    /// When `column` belongs to an ancestor, the ancestor's table is searched and only the
    /// identities that also exist in this type's own table are kept.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedCriteria`] if neither this type nor any ancestor declares `column`.
    pub async fn fetch_where(
        &self,
        connection: &mut SqliteConnection,
        column: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<Tracked<E>>> {
        let ids = self.matching_ids(connection, column, value.into()).await?;

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            records.push(self.fetch(connection, id).await?);
        }

        Ok(records)
    }

    async fn matching_ids(
        &self,
        connection: &mut SqliteConnection,
        column: &str,
        value: Value,
    ) -> Result<Vec<i64>> {
        let leaf = self.leaf();
        let Some((owner, column)) = self.tree.resolve(column) else {
            return Err(Error::MalformedCriteria {
                entity: leaf.table,
                column: column.to_string(),
            });
        };

        let rows = fetch_all(
            connection,
            &Select::new(
                owner.table,
                &[owner.identity],
                ColumnEquals::matching(column, value),
            )
            .ordered_by(owner.identity),
        )
        .await?;

        let ids = rows
            .into_iter()
            .filter_map(|row| row.into_iter().next().and_then(|v| v.as_integer()))
            .collect::<Vec<_>>();

        if owner == leaf {
            return Ok(ids);
        }

        let mut kept = Vec::with_capacity(ids.len());
        for id in ids {
            if self.has(connection, id).await? {
                kept.push(id);
            }
        }

        Ok(kept)
    }

    /// Insert an unsaved record.
    ///
    /// The eldest table of the chain receives its fields without the identity, which the
    /// database assigns. Every later table, the leaf last, is inserted with that same identity.
    /// All inserts share one transaction, and every identity field of the record is set to the
    /// assigned value afterwards.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] if the record is not [`Lifecycle::Unsaved`],
    /// [`Error::ConstraintViolation`] if the database rejects a row.
    pub async fn create(
        &self,
        connection: &mut SqliteConnection,
        record: &mut Tracked<E>,
    ) -> Result<()> {
        if record.state() != Lifecycle::Unsaved {
            return Err(Error::invalid_state("create", record.state()));
        }

        let mut tx = connection.begin().await?;
        let mut assigned: Option<i64> = None;

        for (entity, fields) in self.tree.tables() {
            let row = fields
                .iter()
                .copied()
                .filter_map(|field| {
                    if field == entity.identity {
                        assigned.map(|id| (field, Value::Integer(id)))
                    } else {
                        Some((field, record.value_of(field).unwrap_or(Value::Null)))
                    }
                })
                .collect::<Vec<_>>();

            let result = execute(&mut tx, &Insert::new(entity.table, row)).await?;
            if assigned.is_none() {
                assigned = Some(result.last_insert_rowid());
            }
        }

        tx.commit().await?;

        if let Some(id) = assigned {
            for (entity, _) in self.tree.tables() {
                record.assign_untracked(entity.identity, Value::Integer(id))?;
            }
            debug!(table = self.leaf().table, id, "created");
        }

        record.clear_changes();
        record.mark(Lifecycle::Persisted);

        Ok(())
    }

    /// Insert a leaf row whose identity is already known, typically because the ancestor rows were
    /// created beforehand, then load the complete record.
    ///
    /// `values` are given in the order of [`InheritanceTree::unique_fields`]; the identity must be
    /// among them.
    ///
    /// # Errors
    ///
    /// [`Error::FieldCount`] if `values` does not match the leaf's own fields, plus everything
    /// [`fetch`](Self::fetch) and inserting may raise.
    pub async fn create_unique(
        &self,
        connection: &mut SqliteConnection,
        values: Vec<Value>,
    ) -> Result<Tracked<E>> {
        let leaf = self.leaf();
        let fields = self.tree.unique_fields();

        if values.len() != fields.len() {
            return Err(Error::FieldCount {
                expected: fields.len(),
                found: values.len(),
            });
        }

        let row = fields.iter().copied().zip(values).collect::<Vec<_>>();
        let Some(id) = row
            .iter()
            .find(|(name, _)| *name == leaf.identity)
            .and_then(|(_, v)| v.as_integer())
        else {
            return Err(Error::Decode {
                field: leaf.identity.to_string(),
                expected: "INTEGER",
                found: "a non-integer identity".to_string(),
            });
        };

        execute(connection, &Insert::new(leaf.table, row)).await?;
        debug!(table = leaf.table, id, "created with known identity");

        self.fetch(connection, id).await
    }

    /// Write the pending changes of a record, one `UPDATE` per table that owns at least one of
    /// them, all inside one transaction. The pending-write set is cleared afterwards.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] unless the record is [`Lifecycle::Persisted`], [`Error::NotFound`]
    /// if one of the owning tables no longer has the record's row (nothing is written then).
    pub async fn update(
        &self,
        connection: &mut SqliteConnection,
        record: &mut Tracked<E>,
    ) -> Result<()> {
        if record.state() != Lifecycle::Persisted {
            return Err(Error::invalid_state("update", record.state()));
        }

        if !record.is_dirty() {
            return Ok(());
        }

        let statements = self.plan_update(record)?;

        let mut tx = connection.begin().await?;
        for (statement, entity, id) in &statements {
            let result = execute(&mut tx, statement).await?;
            if result.rows_affected() == 0 {
                return Err(Error::NotFound {
                    table: entity.table,
                    id: *id,
                });
            }
        }
        tx.commit().await?;

        record.clear_changes();

        Ok(())
    }

    /// The statements [`update`](Self::update) would issue for the record's pending changes.
    ///
    /// # Errors
    ///
    /// [`Error::Decode`] if an owning table's identity field does not hold an integer.
    pub fn plan_update(
        &self,
        record: &Tracked<E>,
    ) -> Result<Vec<(Update, &'static EntityDescriptor, i64)>> {
        self.tree
            .partition(record.changes())
            .into_iter()
            .map(|(entity, changes)| {
                let Some(id) = record
                    .value_of(entity.identity)
                    .and_then(|v| v.as_integer())
                else {
                    return Err(Error::Decode {
                        field: entity.identity.to_string(),
                        expected: "INTEGER",
                        found: "a non-integer identity".to_string(),
                    });
                };

                let assignments = changes
                    .into_iter()
                    .map(|(name, value)| (*name, value.clone()))
                    .collect();

                Ok((
                    Update::new(
                        entity.table,
                        assignments,
                        ColumnEquals::matching(entity.identity, Value::Integer(id)),
                    ),
                    entity,
                    id,
                ))
            })
            .collect()
    }

    /// Remove the record's row from this type's own table. Ancestor rows and rows of related
    /// tables are left alone.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] unless the record is [`Lifecycle::Persisted`].
    pub async fn delete(
        &self,
        connection: &mut SqliteConnection,
        record: &mut Tracked<E>,
    ) -> Result<()> {
        if record.state() != Lifecycle::Persisted {
            return Err(Error::invalid_state("delete", record.state()));
        }

        let leaf = self.leaf();
        let Some(id) = record.identity() else {
            return Err(Error::Decode {
                field: leaf.identity.to_string(),
                expected: "INTEGER",
                found: "a non-integer identity".to_string(),
            });
        };

        execute(
            connection,
            &Delete::new(
                leaf.table,
                ColumnEquals::matching(leaf.identity, Value::Integer(id)),
            ),
        )
        .await?;
        debug!(table = leaf.table, id, "deleted");

        record.mark(Lifecycle::Deleted);

        Ok(())
    }
}
