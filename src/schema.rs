//! Checks a parsed SQL schema against the tables an inheritance tree expects.

use std::fmt::Display;

use mbs_orm_sqlparse::schema::{SqlSchema, SqlTable};

use crate::entity::inheritance::InheritanceTree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaMismatch {
    MissingTable {
        table: &'static str,
    },
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
    /// A column the table has but no entity of the chain owns there. Columns with a default or
    /// nullable columns would not break inserts, so this is informational.
    UnexpectedColumn {
        table: &'static str,
        column: String,
    },
    IdentityNotPrimaryKey {
        table: &'static str,
        identity: &'static str,
    },
}

impl Display for SchemaMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTable { table } => write!(f, "table \"{table}\" does not exist"),
            Self::MissingColumn { table, column } => {
                write!(f, "table \"{table}\" lacks column \"{column}\"")
            }
            Self::UnexpectedColumn { table, column } => {
                write!(f, "table \"{table}\" has unmapped column \"{column}\"")
            }
            Self::IdentityNotPrimaryKey { table, identity } => {
                write!(f, "\"{table}\".\"{identity}\" is not the primary key")
            }
        }
    }
}

/// Compare every table of `tree`, ancestors included, with its definition in `schema`.
///
/// An empty result means every owned field has a column in the owning table and every identity is
/// its table's primary key.
#[must_use]
pub fn verify(schema: &SqlSchema, tree: &InheritanceTree) -> Vec<SchemaMismatch> {
    tree.tables()
        .flat_map(|(entity, fields)| match schema.find_table(entity.table) {
            None => vec![SchemaMismatch::MissingTable {
                table: entity.table,
            }],
            Some(table) => verify_table(table, entity.table, entity.identity, fields),
        })
        .collect()
}

fn verify_table(
    table: &SqlTable,
    name: &'static str,
    identity: &'static str,
    fields: &[&'static str],
) -> Vec<SchemaMismatch> {
    let mut mismatches = fields
        .iter()
        .copied()
        .filter(|f| table.find_column(f).is_none())
        .map(|column| SchemaMismatch::MissingColumn {
            table: name,
            column,
        })
        .collect::<Vec<_>>();

    if table
        .find_column(identity)
        .is_some_and(|c| !c.primary_key)
    {
        mismatches.push(SchemaMismatch::IdentityNotPrimaryKey {
            table: name,
            identity,
        });
    }

    mismatches.extend(
        table
            .columns
            .iter()
            .filter(|c| !fields.contains(&c.name.as_str()))
            .map(|c| SchemaMismatch::UnexpectedColumn {
                table: name,
                column: c.name.clone(),
            }),
    );

    mismatches
}

#[cfg(test)]
mod test {
    use mbs_orm_sqlparse::query::parse_schema;

    use super::{SchemaMismatch, verify};
    use crate::entity::{EntityDescriptor, inheritance::InheritanceTree};

    fn user() -> &'static EntityDescriptor {
        static USER: EntityDescriptor = EntityDescriptor {
            table: "User_",
            identity: "user_id",
            fields: &["user_id", "email", "name_"],
            parent: None,
        };
        &USER
    }

    fn student() -> &'static EntityDescriptor {
        static STUDENT: EntityDescriptor = EntityDescriptor {
            table: "Student",
            identity: "student_id",
            fields: &["user_id", "email", "name_", "student_id", "semester"],
            parent: Some(user),
        };
        &STUDENT
    }

    #[test]
    fn test_matching_schema() {
        let schema = parse_schema(
            "CREATE TABLE User_ (user_id INTEGER PRIMARY KEY, email TEXT, name_ TEXT);
             CREATE TABLE Student (student_id INTEGER PRIMARY KEY, semester INTEGER);",
        )
        .expect("valid script");
        let tree = InheritanceTree::build(student()).expect("valid tree");

        assert_eq!(verify(&schema, &tree), vec![]);
    }

    #[test]
    fn test_mismatches() {
        let schema = parse_schema(
            "CREATE TABLE Student (student_id INTEGER, semester_ INTEGER);",
        )
        .expect("valid script");
        let tree = InheritanceTree::build(student()).expect("valid tree");

        assert_eq!(
            verify(&schema, &tree),
            vec![
                SchemaMismatch::MissingTable { table: "User_" },
                SchemaMismatch::MissingColumn {
                    table: "Student",
                    column: "semester",
                },
                SchemaMismatch::IdentityNotPrimaryKey {
                    table: "Student",
                    identity: "student_id",
                },
                SchemaMismatch::UnexpectedColumn {
                    table: "Student",
                    column: "semester_".to_string(),
                },
            ]
        );
    }
}
