//! Transient state used by the engine.
//!
//! This is initialized on startup.

use std::time::Duration;

use thiserror::Error;
use tracing::{info_span, Instrument};

use autoquery_configuration::PoolSettings;
use query_engine_execution::metrics;

/// State for our engine.
#[derive(Debug, Clone)]
pub struct State {
    pub metrics: metrics::Metrics,
    pub pool: sqlx::SqlitePool,
}

/// Create a connection pool and wrap it inside an engine State.
pub async fn create_state(
    connection_uri: &str,
    pool_settings: &PoolSettings,
    metrics_registry: &mut prometheus::Registry,
) -> Result<State, InitializationError> {
    let pool = create_pool(connection_uri, pool_settings)
        .instrument(info_span!("Create connection pool"))
        .await
        .map_err(InitializationError::UnableToCreatePool)?;

    let metrics = async {
        let metrics_inner = metrics::Metrics::initialize(metrics_registry)
            .map_err(InitializationError::MetricsError)?;
        metrics_inner.update_pool_metrics(&pool);
        Ok::<_, InitializationError>(metrics_inner)
    }
    .instrument(info_span!("Setup metrics"))
    .await?;

    Ok(State { metrics, pool })
}

/// Create a connection pool with the given settings.
async fn create_pool(
    connection_uri: &str,
    pool_settings: &PoolSettings,
) -> Result<sqlx::SqlitePool, sqlx::Error> {
    sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(pool_settings.max_connections)
        .acquire_timeout(Duration::from_secs(pool_settings.pool_timeout))
        .idle_timeout(pool_settings.idle_timeout.map(Duration::from_secs))
        .max_lifetime(pool_settings.connection_lifetime.map(Duration::from_secs))
        .connect(connection_uri)
        .await
}

/// State initialization error.
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("unable to initialize connection pool: {0}")]
    UnableToCreatePool(sqlx::Error),
    #[error("error initializing metrics: {0}")]
    MetricsError(prometheus::Error),
}
