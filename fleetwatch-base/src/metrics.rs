//! Useful metrics that all agents should track.

use std::sync::Arc;

use eyre::Result;
use prometheus::{Encoder, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};
use tokio::task::JoinHandle;

/// Metrics registry and helpers for a fleetwatch agent.
///
/// Metric names registered here are exported exactly as given. The names and
/// labels are an observable contract with the dashboards that consume them,
/// so no namespace prefix or constant labels are applied.
#[derive(Debug)]
pub struct CoreMetrics {
    agent_name: String,
    listen_port: Option<u16>,
    /// Metrics registry for adding new metrics and gathering reports
    registry: Arc<Registry>,
}

impl CoreMetrics {
    /// Track metrics for a particular agent name.
    pub fn new<S: Into<String>>(
        for_agent: S,
        listen_port: Option<u16>,
        registry: Arc<Registry>,
    ) -> CoreMetrics {
        CoreMetrics {
            agent_name: for_agent.into(),
            listen_port,
            registry,
        }
    }

    /// Register an int gauge.
    pub fn new_int_gauge(
        &self,
        metric_name: &str,
        help: &str,
        labels: &[&str],
    ) -> Result<IntGaugeVec> {
        let gauge = IntGaugeVec::new(Opts::new(metric_name, help), labels)?;
        self.registry.register(Box::new(gauge.clone()))?;
        Ok(gauge)
    }

    /// Register an int counter.
    pub fn new_int_counter(
        &self,
        metric_name: &str,
        help: &str,
        labels: &[&str],
    ) -> Result<IntCounterVec> {
        let counter = IntCounterVec::new(Opts::new(metric_name, help), labels)?;
        self.registry.register(Box::new(counter.clone()))?;
        Ok(counter)
    }

    /// The name of the agent these metrics are tracked for.
    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    /// Gather available metrics into an encoded (plaintext, OpenMetrics
    /// format) report.
    pub fn gather(&self) -> prometheus::Result<Vec<u8>> {
        let collected_metrics = self.registry.gather();
        let mut out_buf = Vec::with_capacity(1024 * 64);
        let encoder = TextEncoder::new();
        encoder.encode(&collected_metrics, &mut out_buf)?;
        Ok(out_buf)
    }

    /// Run an HTTP server serving OpenMetrics format reports on `/metrics`
    ///
    /// This is compatible with Prometheus, which ought to be configured to
    /// scrape me!
    pub fn run_http_server(self: Arc<CoreMetrics>) -> JoinHandle<()> {
        use warp::Filter;
        match self.listen_port {
            None => {
                tracing::info!("not starting prometheus server");
                tokio::spawn(std::future::ready(()))
            }
            Some(port) => {
                tracing::info!(port, "starting prometheus server on 0.0.0.0:{port}");
                tokio::spawn(async move {
                    warp::serve(
                        warp::path!("metrics")
                            .map(move || {
                                warp::reply::with_header(
                                    self.gather().expect("failed to encode metrics"),
                                    "Content-Type",
                                    // OpenMetrics specs demands "application/openmetrics-text;
                                    // version=1.0.0; charset=utf-8"
                                    // but the prometheus scraper itself doesn't seem to care?
                                    // try text/plain to make web browsers happy.
                                    "text/plain; charset=utf-8",
                                )
                            })
                            .or(warp::any().map(|| {
                                warp::reply::with_status(
                                    "go look at /metrics",
                                    warp::http::StatusCode::NOT_FOUND,
                                )
                            })),
                    )
                    .run(([0, 0, 0, 0], port))
                    .await;
                })
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn registered_metrics_show_up_in_reports_unprefixed() {
        let metrics = CoreMetrics::new("test", None, Arc::new(Registry::new()));
        let gauge = metrics
            .new_int_gauge("balances", "Balance of the account", &["address", "nickname"])
            .unwrap();
        gauge.with_label_values(&["0xaa", "alice"]).set(7);

        let report = String::from_utf8(metrics.gather().unwrap()).unwrap();
        assert!(report.contains("balances{address=\"0xaa\",nickname=\"alice\"} 7"));
    }

    #[test]
    fn duplicate_registration_is_an_error() {
        let metrics = CoreMetrics::new("test", None, Arc::new(Registry::new()));
        metrics
            .new_int_counter("unexpectedRpcErrors", "errors", &["section", "name"])
            .unwrap();
        assert!(metrics
            .new_int_counter("unexpectedRpcErrors", "errors", &["section", "name"])
            .is_err());
    }
}
