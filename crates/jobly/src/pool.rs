//! Connection pool utilities

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Create a connection pool from a [`StoreConfig`].
///
/// Uses `NoTls`; put a TLS-terminating proxy in front of the database or
/// build the pool yourself if the server requires TLS.
///
/// # Example
///
/// ```ignore
/// let pool = jobly::create_pool(&StoreConfig::from_env()?)?;
/// let client = pool.get().await?;
/// let jobs = jobly::models::job::find_all(&client, &JobFilter::new()).await?;
/// ```
pub fn create_pool(config: &StoreConfig) -> StoreResult<Pool> {
    config.validate()?;

    let mut pg_config: tokio_postgres::Config = config
        .database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| StoreError::Connection(e.to_string()))?;
    if let Some(timeout) = config.connect_timeout_duration() {
        pg_config.connect_timeout(timeout);
    }

    let mgr = Manager::from_config(pg_config, NoTls, default_manager_config());
    Pool::builder(mgr)
        .max_size(config.max_connections)
        .build()
        .map_err(|e| StoreError::Pool(e.to_string()))
}

fn default_manager_config() -> ManagerConfig {
    ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    }
}
