use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Call once per process.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;

        describe_counter!(
            "moodmeter_aggregations_total",
            "Aggregations served over HTTP"
        );
        describe_gauge!(
            "moodmeter_overall_score",
            "Most recent overall sentiment score (0-100)"
        );
        describe_counter!(
            "moodmeter_anomalies_total",
            "Aggregations flagged as anomalous"
        );
        describe_counter!(
            "moodmeter_weights_reload_failures_total",
            "Weights file changes rejected by validation"
        );

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
