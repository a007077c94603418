use std::path::PathBuf;

use dotenvy::dotenv;

use crate::error::{Error, Result};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://mbs.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Where the database lives and how to set it up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    /// SQL script creating the schema, run on an empty database and on reset.
    pub init_script: Option<PathBuf>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            init_script: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl DatabaseConfig {
    /// Read `DATABASE_URL`, `MBS_INIT_SCRIPT` and `MBS_MAX_CONNECTIONS` from the environment, or
    /// from a corresponding `.env` file.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if a variable is not valid UTF-8 or `MBS_MAX_CONNECTIONS` is not a
    /// positive number.
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();

        Self::from_lookup(|key| match std::env::var(key) {
            Ok(v) => Ok(Some(v)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(Error::Config(format!("{key}: {e}"))),
        })
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<Option<String>>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("DATABASE_URL")? {
            config.url = url;
        }

        config.init_script = lookup("MBS_INIT_SCRIPT")?.map(PathBuf::from);

        if let Some(max) = lookup("MBS_MAX_CONNECTIONS")? {
            config.max_connections = match max.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(Error::Config(format!(
                        "MBS_MAX_CONNECTIONS must be a positive number, got \"{max}\""
                    )));
                }
            };
        }

        Ok(config)
    }

    /// Whether the URL points at an in-memory database, which only exists per connection.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

#[cfg(test)]
mod test {
    use std::{collections::HashMap, path::PathBuf};

    use super::{DEFAULT_DATABASE_URL, DatabaseConfig};
    use crate::error::Error;

    fn from_map(vars: &[(&str, &str)]) -> Result<DatabaseConfig, Error> {
        let vars = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<HashMap<_, _>>();

        DatabaseConfig::from_lookup(|key| Ok(vars.get(key).cloned()))
    }

    #[test]
    fn test_defaults() {
        let config = from_map(&[]).expect("defaults");

        assert_eq!(config.url, DEFAULT_DATABASE_URL);
        assert_eq!(config.init_script, None);
        assert!(!config.is_in_memory());
    }

    #[test]
    fn test_overrides() {
        let config = from_map(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("MBS_INIT_SCRIPT", "schema/init.sql"),
            ("MBS_MAX_CONNECTIONS", "2"),
        ])
        .expect("valid config");

        assert!(config.is_in_memory());
        assert_eq!(config.init_script, Some(PathBuf::from("schema/init.sql")));
        assert_eq!(config.max_connections, 2);
    }

    #[test]
    fn test_bad_pool_size() {
        assert!(matches!(
            from_map(&[("MBS_MAX_CONNECTIONS", "0")]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            from_map(&[("MBS_MAX_CONNECTIONS", "many")]),
            Err(Error::Config(_))
        ));
    }
}
