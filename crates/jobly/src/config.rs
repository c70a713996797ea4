//! Store configuration.
//!
//! Configuration comes either from a TOML file:
//!
//! ```toml
//! database_url = "postgres://${PGUSER}@localhost/jobly"
//! max_connections = 8
//! connect_timeout_secs = 5
//! ```
//!
//! or from the environment (`DATABASE_URL`, `JOBLY_MAX_CONNECTIONS`,
//! `JOBLY_CONNECT_TIMEOUT_SECS`), with a `.env` file loaded first if present.

use crate::error::{StoreError, StoreResult};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default number of pooled connections.
pub const DEFAULT_MAX_CONNECTIONS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

fn default_max_connections() -> usize {
    DEFAULT_MAX_CONNECTIONS
}

impl StoreConfig {
    /// Create a configuration with defaults for everything but the URL.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout_secs: None,
        }
    }

    pub fn max_connections(mut self, n: usize) -> Self {
        self.max_connections = n;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_secs = Some(timeout.as_secs());
        self
    }

    pub fn connect_timeout_duration(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    /// Read a TOML file, expanding `${VAR}` references in string values.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            StoreError::Config(msg) => StoreError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Parse TOML text, expanding `${VAR}` references in `database_url`.
    pub fn from_toml_str(raw: &str) -> StoreResult<Self> {
        let mut config: Self =
            toml::from_str(raw).map_err(|e| StoreError::Config(format!("invalid config: {e}")))?;
        config.database_url = expand_env(&config.database_url)?;
        config.validate()?;
        Ok(config)
    }

    /// Build from the process environment, loading `.env` first if present.
    pub fn from_env() -> StoreResult<Self> {
        // A missing .env file is fine; the variables may already be set.
        let _ = dotenvy::dotenv();

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| StoreError::Config("DATABASE_URL is not set".to_string()))?;
        let mut config = Self::new(database_url);

        if let Ok(raw) = std::env::var("JOBLY_MAX_CONNECTIONS") {
            config.max_connections = raw.parse().map_err(|e| {
                StoreError::Config(format!("JOBLY_MAX_CONNECTIONS={raw:?}: {e}"))
            })?;
        }
        if let Ok(raw) = std::env::var("JOBLY_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout_secs = Some(raw.parse().map_err(|e| {
                StoreError::Config(format!("JOBLY_CONNECT_TIMEOUT_SECS={raw:?}: {e}"))
            })?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.database_url.trim().is_empty() {
            return Err(StoreError::Config("database_url is empty".to_string()));
        }
        if self.max_connections == 0 {
            return Err(StoreError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Replace `${NAME}` with the value of environment variable `NAME`.
fn expand_env(input: &str) -> StoreResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            return Err(StoreError::Config(format!(
                "unterminated ${{...}} in {input:?}"
            )));
        };
        let name = &after[..end];
        let value = std::env::var(name).map_err(|_| {
            StoreError::Config(format!("environment variable {name} is not set"))
        })?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
