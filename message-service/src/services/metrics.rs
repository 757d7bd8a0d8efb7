//! Metrics collection and Prometheus export.
//!
//! Installs the exporter and records per-operation message counters.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Subsequent calls are no-ops.
pub fn init_metrics() {
    METRICS_HANDLE.get_or_init(|| {
        PrometheusBuilder::new()
            .install_recorder()
            .expect("failed to install Prometheus recorder")
    });
}

/// Get the current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

pub fn record_listed(count: usize, truncated: bool) {
    counter!("messages_listed_total").increment(count as u64);
    if truncated {
        counter!("message_list_truncated_total").increment(1);
    }
}

pub fn record_created() {
    counter!("messages_created_total").increment(1);
}

pub fn record_failure(operation: &'static str, kind: &'static str) {
    counter!("message_request_failures_total", "operation" => operation, "kind" => kind)
        .increment(1);
}
