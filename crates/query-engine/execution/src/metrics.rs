//! Metrics setup and update for the engine.

use prometheus::core::{AtomicF64, AtomicI64, AtomicU64, GenericCounter, GenericGauge};
use std::time::Duration;

/// The counters and gauges the engine updates.
#[derive(Debug, Clone)]
pub struct Metrics {
    pub query_total: GenericCounter<AtomicU64>,
    pub count_query_total: GenericCounter<AtomicU64>,
    pub aggregate_query_total: GenericCounter<AtomicU64>,
    pub reference_query_total: GenericCounter<AtomicU64>,
    pub error_total: GenericCounter<AtomicU64>,
    pub pool_size: GenericGauge<AtomicI64>,
    pub pool_idle_count: GenericGauge<AtomicI64>,
    pub pool_active_count: GenericGauge<AtomicI64>,
    pub pool_max_connections: GenericGauge<AtomicI64>,
    pub pool_acquire_timeout: GenericGauge<AtomicF64>,
    pub pool_idle_timeout: GenericGauge<AtomicF64>,
    pub pool_max_lifetime: GenericGauge<AtomicF64>,
}

impl Metrics {
    /// Set up counters and gauges used to produce Prometheus metrics
    pub fn initialize(metrics_registry: &mut prometheus::Registry) -> Result<Self, prometheus::Error> {
        let query_total = add_int_counter_metric(
            metrics_registry,
            "autoquery_query_total",
            "Total successful queries.",
        )?;

        let count_query_total = add_int_counter_metric(
            metrics_registry,
            "autoquery_count_query_total",
            "Total successful queries counting the rows of a paged result.",
        )?;

        let aggregate_query_total = add_int_counter_metric(
            metrics_registry,
            "autoquery_aggregate_query_total",
            "Total successful queries computing aggregates.",
        )?;

        let reference_query_total = add_int_counter_metric(
            metrics_registry,
            "autoquery_reference_query_total",
            "Total successful queries loading reference collections.",
        )?;

        let error_total = add_int_counter_metric(
            metrics_registry,
            "autoquery_error_total",
            "Total failed requests.",
        )?;

        let pool_size = add_int_gauge_metric(
            metrics_registry,
            "autoquery_pool_size",
            "The number of connections currently active. This includes idle connections.",
        )?;

        let pool_idle_count = add_int_gauge_metric(
            metrics_registry,
            "autoquery_pool_idle",
            "The number of connections active and idle (not in use).",
        )?;

        let pool_active_count = add_int_gauge_metric(
            metrics_registry,
            "autoquery_pool_active",
            "The number of connections current active. This does not include idle connections.",
        )?;

        let pool_max_connections = add_int_gauge_metric(
            metrics_registry,
            "autoquery_pool_max_connections",
            "The maximum number of connections that this pool should maintain.",
        )?;

        let pool_acquire_timeout = add_gauge_metric(
            metrics_registry,
            "autoquery_pool_acquire_timeout",
            "Get the maximum amount of time to spend waiting for a connection, in seconds.",
        )?;

        let pool_idle_timeout = add_gauge_metric(
            metrics_registry,
            "autoquery_pool_idle_timeout",
            "Get the maximum idle duration for individual connections, in seconds.",
        )?;

        let pool_max_lifetime = add_gauge_metric(
            metrics_registry,
            "autoquery_pool_max_lifetime",
            "Get the maximum lifetime of individual connections, in seconds.",
        )?;

        Ok(Metrics {
            query_total,
            count_query_total,
            aggregate_query_total,
            reference_query_total,
            error_total,
            pool_size,
            pool_idle_count,
            pool_active_count,
            pool_max_connections,
            pool_acquire_timeout,
            pool_idle_timeout,
            pool_max_lifetime,
        })
    }

    /// Update the pool gauges from the current state of the pool.
    pub fn update_pool_metrics(&self, pool: &sqlx::SqlitePool) {
        let pool_size: i64 = pool.size().into();
        self.pool_size.set(pool_size);

        let pool_idle = i64::try_from(pool.num_idle()).unwrap_or(i64::MAX);
        self.pool_idle_count.set(pool_idle);

        self.pool_active_count.set(pool_size - pool_idle);

        let pool_options = pool.options();

        let max_connections: i64 = pool_options.get_max_connections().into();
        self.pool_max_connections.set(max_connections);

        self.pool_acquire_timeout
            .set(pool_options.get_acquire_timeout().as_secs_f64());

        // if nothing is set, return 0
        self.pool_idle_timeout.set(
            pool_options
                .get_idle_timeout()
                .unwrap_or(Duration::ZERO)
                .as_secs_f64(),
        );

        // if nothing is set, return 0
        self.pool_max_lifetime.set(
            pool_options
                .get_max_lifetime()
                .unwrap_or(Duration::ZERO)
                .as_secs_f64(),
        );
    }
}

/// Create a new int counter metric and register it with the provided Prometheus Registry
fn add_int_counter_metric(
    metrics_registry: &mut prometheus::Registry,
    metric_name: &str,
    metric_description: &str,
) -> Result<GenericCounter<AtomicU64>, prometheus::Error> {
    let int_counter =
        prometheus::IntCounter::with_opts(prometheus::Opts::new(metric_name, metric_description))?;
    metrics_registry.register(Box::new(int_counter.clone()))?;
    Ok(int_counter)
}

/// Create a new int gauge metric and register it with the provided Prometheus Registry
fn add_int_gauge_metric(
    metrics_registry: &mut prometheus::Registry,
    metric_name: &str,
    metric_description: &str,
) -> Result<GenericGauge<AtomicI64>, prometheus::Error> {
    let int_gauge =
        prometheus::IntGauge::with_opts(prometheus::Opts::new(metric_name, metric_description))?;
    metrics_registry.register(Box::new(int_gauge.clone()))?;
    Ok(int_gauge)
}

/// Create a new gauge metric and register it with the provided Prometheus Registry
fn add_gauge_metric(
    metrics_registry: &mut prometheus::Registry,
    metric_name: &str,
    metric_description: &str,
) -> Result<GenericGauge<AtomicF64>, prometheus::Error> {
    let gauge =
        prometheus::Gauge::with_opts(prometheus::Opts::new(metric_name, metric_description))?;
    metrics_registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_register_once_per_registry() {
        let mut registry = prometheus::Registry::new();
        let metrics = Metrics::initialize(&mut registry).unwrap();
        metrics.query_total.inc();

        let families = registry.gather();
        let query_total = families
            .iter()
            .find(|family| family.get_name() == "autoquery_query_total")
            .unwrap();
        assert_eq!(query_total.get_metric()[0].get_counter().get_value(), 1.0);

        assert!(Metrics::initialize(&mut registry).is_err());
    }
}
