use std::path::PathBuf;

use clap::Parser;
use eyre::Context;
use mbs_domain::Catalog;
use mbs_orm::{
    Database,
    schema::{SchemaMismatch, verify},
};
use mbs_orm_sqlparse::{
    query::{parse_schema, parse_tables},
    schema::SqlSchema,
};
use tracing::{info, warn};

use crate::Connection;

/// Compare the database schema with the entity types and report every difference
#[derive(Parser, Debug)]
pub struct CheckSchema {
    /// Check this SQL script instead of the live database.
    #[arg(short, long, value_name = "PATH")]
    script: Option<PathBuf>,
}

impl CheckSchema {
    pub async fn run(&self, connection: &Connection) -> eyre::Result<()> {
        let schema = load_schema(self.script.as_ref(), connection).await?;
        let catalog = Catalog::new().context("Inconsistent entity definitions")?;

        let mut mismatches = catalog
            .trees()
            .into_iter()
            .flat_map(|tree| verify(&schema, tree))
            .collect::<Vec<SchemaMismatch>>();
        // Ancestor tables are checked once per descendant.
        mismatches.sort_by_key(ToString::to_string);
        mismatches.dedup();

        for mismatch in &mismatches {
            warn!("{mismatch}");
        }

        if mismatches.is_empty() {
            info!(tables = schema.tables.len(), "Schema matches the entity types");
            Ok(())
        } else {
            Err(eyre::eyre!("Found {} schema mismatches", mismatches.len()))
        }
    }
}

/// (Re-)Generate the database schema in JSON format
#[derive(Parser, Debug)]
pub struct DumpSchema {
    /// Dump this SQL script instead of the live database.
    #[arg(short, long, value_name = "PATH")]
    script: Option<PathBuf>,
}

impl DumpSchema {
    pub async fn run(&self, connection: &Connection) -> eyre::Result<()> {
        let schema = load_schema(self.script.as_ref(), connection).await?;

        let mbs_dir = std::env::current_dir()
            .context("Failed to determine current directory")?
            .join("mbs");

        let schema_file = mbs_dir.join("schema.json");

        tokio::fs::create_dir_all(&mbs_dir)
            .await
            .context("Failed to create mbs directory")?;

        tokio::fs::write(
            &schema_file,
            schema.to_json().context("Failed to serialize schema")?,
        )
        .await
        .context("Failed to write schema")?;

        info!("Schema file updated under {}", schema_file.display());

        Ok(())
    }
}

async fn load_schema(
    script: Option<&PathBuf>,
    connection: &Connection,
) -> eyre::Result<SqlSchema> {
    if let Some(path) = script {
        let script = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        return parse_schema(&script).context("Failed to parse schema script");
    }

    let database = Database::connect(connection.config()?)
        .await
        .context("Failed to connect to database")?;

    let tables = database
        .table_definitions()
        .await
        .context("Failed to read table definitions")?
        .iter()
        .map(|sql| parse_tables(sql))
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to parse table SQL")?
        .into_iter()
        .flatten()
        .collect();

    Ok(SqlSchema { tables })
}
