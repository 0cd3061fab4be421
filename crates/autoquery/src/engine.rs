//! Serve requests: translate, filter, execute, and run the response hooks.

use std::sync::Arc;

use tracing::{info_span, Instrument};

use autoquery_configuration::Configuration;
use query_engine_execution::response::QueryResponse;
use query_engine_translation::translation::query::{self, ConstructedQuery, QueryRequest};

use crate::error::QueryError;
use crate::registry::{Registry, ResponseContext};
use crate::state::{self, InitializationError, State};

/// The engine. Cloning it is cheap and clones share the connection pool.
#[derive(Debug, Clone)]
pub struct AutoQuery {
    configuration: Arc<Configuration>,
    state: State,
    registry: Arc<Registry>,
}

impl AutoQuery {
    pub fn new(configuration: Configuration, state: State, registry: Registry) -> Self {
        AutoQuery {
            configuration: Arc::new(configuration),
            state,
            registry: Arc::new(registry),
        }
    }

    /// Connect to the configured database and register the engine's metrics.
    pub async fn connect(
        configuration: Configuration,
        registry: Registry,
        metrics_registry: &mut prometheus::Registry,
    ) -> Result<Self, InitializationError> {
        let state = state::create_state(
            &configuration.connection_uri,
            &configuration.pool_settings,
            metrics_registry,
        )
        .instrument(info_span!("Initialise state"))
        .await
        .map_err(|err| {
            tracing::error!(
                meta.signal_type = "log",
                event.domain = "autoquery",
                event.name = "Initialization error",
                name = "Initialization error",
                body = %err,
                error = true,
            );
            err
        })?;
        Ok(AutoQuery::new(configuration, state, registry))
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Translate a request and run the query filters that apply to its descriptor.
    pub fn create_query(&self, request: &QueryRequest) -> Result<ConstructedQuery, QueryError> {
        info_span!("Plan query").in_scope(|| {
            let metadata = &self.configuration.metadata;
            let mut query =
                query::translate(metadata, &self.configuration.query_settings, request)?;
            if let Some(descriptor) = metadata.descriptors.0.get(&request.descriptor) {
                for filter in self.registry.filters_for(&request.descriptor, descriptor) {
                    filter(&mut query, request)?;
                }
            }
            Ok(query)
        })
    }

    /// Execute a constructed query, then let the response hooks claim the aggregate
    /// commands that were not built in.
    pub async fn execute(
        &self,
        request: &QueryRequest,
        query: ConstructedQuery,
    ) -> Result<QueryResponse, QueryError> {
        let mut connection = self.state.pool.acquire().await?;
        let result = query_engine_execution::query::execute(
            &mut connection,
            &self.state.metrics,
            &query.plan,
        )
        .instrument(info_span!("Execute query", descriptor = %query.descriptor))
        .await;
        drop(connection);
        self.state.metrics.update_pool_metrics(&self.state.pool);
        let mut response = result?;

        let mut meta = response.meta.take().unwrap_or_default();
        let context = ResponseContext {
            request,
            response: &response,
        };
        self.registry
            .run_response_hooks(&context, query.commands, &mut meta);
        response.meta = (!meta.is_empty()).then_some(meta);
        Ok(response)
    }

    /// Serve a request.
    pub async fn query(&self, request: QueryRequest) -> Result<QueryResponse, QueryError> {
        let result = match self.create_query(&request) {
            Ok(query) => self.execute(&request, query).await,
            Err(err) => Err(err),
        };
        result.map_err(|err| {
            self.state.metrics.error_total.inc();
            tracing::error!(
                meta.signal_type = "log",
                event.domain = "autoquery",
                event.name = "Query error",
                name = "Query error",
                body = %err,
                error = true,
            );
            err
        })
    }
}
