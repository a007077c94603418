use std::str::FromStr;

use sqlx::{
    Connection, Sqlite, SqliteConnection, Transaction,
    pool::PoolConnection,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
};
use tracing::{debug, info};

use crate::{
    config::DatabaseConfig,
    error::{Error, Result},
};

/// The query execution gateway: a connection pool plus the schema bootstrap around it.
///
/// Repositories never hold a connection themselves; callers take one from here (or open a
/// transaction) and pass it along.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    config: DatabaseConfig,
}

impl Database {
    /// Open the database, creating the file if needed. A database without any table is
    /// initialised with the configured init script.
    ///
    /// # Errors
    ///
    /// If the URL is invalid, the database cannot be opened, or the init script fails.
    pub async fn connect(config: DatabaseConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

        // Every connection to an in-memory database sees its own, empty database.
        let pool = if config.is_in_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        }
        .connect_with(options)
        .await?;

        let database = Self { pool, config };

        if database.tables().await?.is_empty() {
            info!(url = %database.config.url, "initialising empty database");
            let mut connection = database.acquire().await?;
            database.run_init_script(&mut connection).await?;
        }

        Ok(database)
    }

    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    #[must_use]
    pub const fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// # Errors
    ///
    /// If no connection could be obtained from the pool.
    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await?)
    }

    /// # Errors
    ///
    /// If no connection could be obtained or the transaction could not be started.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Names of all user tables.
    ///
    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn tables(&self) -> Result<Vec<String>> {
        Ok(sqlx::query_scalar(
            "SELECT name FROM sqlite_schema WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    /// The `CREATE TABLE` statements of all user tables, as stored by SQLite.
    ///
    /// # Errors
    ///
    /// If there's been a problem communicating with the database.
    pub async fn table_definitions(&self) -> Result<Vec<String>> {
        Ok(sqlx::query_scalar(
            "SELECT sql FROM sqlite_schema WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND sql IS NOT NULL ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    /// Drop every table and run the init script again, all in one transaction.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if no init script is configured or it cannot be read, otherwise if a
    /// statement fails, in which case nothing changes.
    pub async fn reset(&self) -> Result<()> {
        let script = self.read_init_script()?;
        let tables = self.tables().await?;

        let mut connection = self.acquire().await?;
        sqlx::query("PRAGMA foreign_keys = OFF")
            .execute(&mut *connection)
            .await?;

        let outcome = Self::replace_schema(&mut connection, &tables, &script).await;

        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&mut *connection)
            .await?;

        outcome?;
        info!(dropped = tables.len(), "database reset");

        Ok(())
    }

    async fn replace_schema(
        connection: &mut SqliteConnection,
        tables: &[String],
        script: &str,
    ) -> Result<()> {
        let mut tx = connection.begin().await?;

        for table in tables.iter().rev() {
            debug!(table, "dropping");
            sqlx::query(&format!(
                "DROP TABLE IF EXISTS \"{}\"",
                table.replace('"', "\"\"")
            ))
            .execute(&mut *tx)
            .await?;
        }

        sqlx::raw_sql(script).execute(&mut *tx).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn run_init_script(&self, connection: &mut SqliteConnection) -> Result<()> {
        if self.config.init_script.is_none() {
            debug!("no init script configured");
            return Ok(());
        }

        let script = self.read_init_script()?;
        let mut tx = connection.begin().await?;
        sqlx::raw_sql(&script).execute(&mut *tx).await?;
        tx.commit().await?;

        Ok(())
    }

    fn read_init_script(&self) -> Result<String> {
        let Some(path) = &self.config.init_script else {
            return Err(Error::Config("no init script configured".to_string()));
        };

        std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))
    }
}
