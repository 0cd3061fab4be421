//! Engines over a freshly seeded in-memory database.

use autoquery::{AutoQuery, Registry};
use autoquery_configuration::Configuration;

/// The statements creating and filling the fixture tables.
const SEED: &str = include_str!("../static/seed.sql");

/// Create an engine over the fixture configuration without any extensions.
pub async fn create_engine() -> anyhow::Result<AutoQuery> {
    create_engine_with(Registry::new()).await
}

/// Create an engine with the given extensions. Each engine gets a database of its own.
pub async fn create_engine_with(registry: Registry) -> anyhow::Result<AutoQuery> {
    let configuration = crate::configuration::configuration().await?;
    create_engine_from(configuration, registry).await
}

/// Create an engine from an adjusted fixture configuration.
pub async fn create_engine_from(
    configuration: Configuration,
    registry: Registry,
) -> anyhow::Result<AutoQuery> {
    init_logging();
    let mut metrics_registry = prometheus::Registry::new();
    let engine = AutoQuery::connect(configuration, registry, &mut metrics_registry).await?;
    seed(&engine.state().pool).await?;
    Ok(engine)
}

/// Create and fill the fixture tables.
pub async fn seed(pool: &sqlx::SqlitePool) -> anyhow::Result<()> {
    let mut connection = pool.acquire().await?;
    for statement in SEED.split(";\n").map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(&mut *connection).await?;
    }
    tracing::debug!("seeded the fixture database");
    Ok(())
}

/// Send log events to the test output. `RUST_LOG` picks the level.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
