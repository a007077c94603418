use serde::{Deserialize, Serialize};
use sqlparser::ast::{
    ColumnDef, ColumnOption, CreateTable, DataType, ObjectName, ObjectNamePart, TableConstraint,
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SqlForeignKey {
    pub target_table: String,
    pub target_column: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SqlColumn {
    pub name: String,
    pub column_type: DataType,
    pub nullable: bool,
    pub unique: bool,
    pub primary_key: bool,
    pub foreign_key: Option<SqlForeignKey>,
}

fn last_name_part(name: &ObjectName) -> Option<String> {
    name.0.iter().last().map(|e| {
        let ObjectNamePart::Identifier(ident) = e;

        ident.value.clone()
    })
}

impl From<&ColumnDef> for SqlColumn {
    fn from(value: &ColumnDef) -> Self {
        let options = value.options.iter().map(|e| &e.option).collect::<Vec<_>>();

        Self {
            name: value.name.value.clone(),
            column_type: value.data_type.clone(),
            nullable: options
                .iter()
                .find_map(|e| match e {
                    ColumnOption::Null => Some(true),
                    ColumnOption::NotNull => Some(false),
                    _ => None,
                })
                .unwrap_or(true),
            unique: options
                .iter()
                .any(|e| matches!(e, ColumnOption::Unique { .. })),
            primary_key: options
                .iter()
                .any(|e| matches!(e, ColumnOption::Unique { is_primary: true, .. })),
            foreign_key: options.iter().find_map(|e| {
                if let ColumnOption::ForeignKey {
                    foreign_table,
                    referred_columns,
                    ..
                } = e
                {
                    if let [column] = referred_columns.as_slice() {
                        return Some(SqlForeignKey {
                            target_table: last_name_part(foreign_table)?,
                            target_column: column.value.clone(),
                        });
                    }
                }

                None
            }),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SqlTable {
    pub name: String,
    pub columns: Vec<SqlColumn>,
    pub primary_key: Option<String>,
}

impl SqlTable {
    #[must_use]
    pub fn find_column(&self, name: &str) -> Option<&SqlColumn> {
        self.columns.iter().find(|e| e.name.eq(name))
    }
}

impl From<&CreateTable> for SqlTable {
    fn from(create_table: &CreateTable) -> Self {
        let mut columns: Vec<SqlColumn> = create_table.columns.iter().map(SqlColumn::from).collect();

        // Table level `PRIMARY KEY (..)` and `FOREIGN KEY (..) REFERENCES ..` constraints.
        for constraint in &create_table.constraints {
            match constraint {
                TableConstraint::PrimaryKey { columns: key, .. } => {
                    if let [key] = key.as_slice() {
                        if let Some(column) = columns.iter_mut().find(|c| c.name == key.value) {
                            column.primary_key = true;
                            column.unique = true;
                        }
                    }
                }
                TableConstraint::ForeignKey {
                    columns: local,
                    foreign_table,
                    referred_columns,
                    ..
                } => {
                    if let ([local], [target]) = (local.as_slice(), referred_columns.as_slice()) {
                        if let Some(column) = columns.iter_mut().find(|c| c.name == local.value) {
                            column.foreign_key =
                                last_name_part(foreign_table).map(|target_table| SqlForeignKey {
                                    target_table,
                                    target_column: target.value.clone(),
                                });
                        }
                    }
                }
                _ => {}
            }
        }

        Self {
            name: last_name_part(&create_table.name).unwrap_or_default(),
            primary_key: columns.iter().find(|e| e.primary_key).map(|e| e.name.clone()),
            columns,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SqlSchema {
    pub tables: Vec<SqlTable>,
}

impl SqlSchema {
    #[must_use]
    pub fn find_table(&self, name: &str) -> Option<&SqlTable> {
        self.tables.iter().find(|e| e.name.eq(name))
    }

    /// Serialize the schema as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// See [`serde_json::to_string_pretty`].
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
