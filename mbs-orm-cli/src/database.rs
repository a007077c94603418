use clap::Parser;
use eyre::Context;
use mbs_orm::Database;
use tracing::info;

use crate::Connection;

/// Create the database if needed and run the init script on it if it has no tables yet
#[derive(Parser, Debug)]
pub struct Init {}

impl Init {
    pub async fn run(&self, connection: &Connection) -> eyre::Result<()> {
        let config = connection.config()?;
        let database = Database::connect(config)
            .await
            .context("Failed to connect to database")?;

        let tables = database.tables().await?;
        info!(
            url = %database.config().url,
            tables = tables.len(),
            "Database ready"
        );

        Ok(())
    }
}

/// Drop every table and recreate the schema from the init script
#[derive(Parser, Debug)]
pub struct Reset {
    /// Required, since all data is lost.
    #[arg(long)]
    yes: bool,
}

impl Reset {
    pub async fn run(&self, connection: &Connection) -> eyre::Result<()> {
        if !self.yes {
            return Err(eyre::eyre!(
                "Refusing to reset without --yes, this deletes all data"
            ));
        }

        let config = connection.config()?;
        if config.init_script.is_none() {
            return Err(eyre::eyre!(
                "Missing init script, either set the `MBS_INIT_SCRIPT` environment variable, or specify it manually via --init-script [PATH]"
            ));
        }

        let database = Database::connect(config)
            .await
            .context("Failed to connect to database")?;
        database.reset().await.context("Failed to reset database")?;

        info!(url = %database.config().url, "Database reset");

        Ok(())
    }
}
