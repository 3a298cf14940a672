use std::sync::OnceLock;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
///
/// Only one recorder can exist per process, so repeated calls return the
/// handle installed by the first.
pub fn init_metrics() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if metrics::set_global_recorder(recorder).is_err() {
                tracing::warn!("A metrics recorder was already installed; /metrics may be empty");
            }

            // Pre-register counters so they appear even before the first increment.
            counter!("upload_requests_total").absolute(0);
            counter!("alerts_received_total").absolute(0);
            counter!("alerts_delivered_total").absolute(0);
            counter!("alerts_failed_total").absolute(0);
            counter!("prediction_log_failures_total").absolute(0);

            // Histogram is lazily created on first record; force creation.
            histogram!("classify_latency_seconds").record(0.0);

            handle
        })
        .clone()
}
