//! Metrics collection and Prometheus export.
//!
//! HTTP request metrics come from `service_core`'s middleware; this module
//! adds storage, model provider and assistant outcome series.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Later calls are no-ops.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
            tracing::info!("Prometheus metrics initialized");
        }
        Err(e) => tracing::warn!(error = %e, "Failed to install Prometheus recorder"),
    }
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Record a storage call (`list_prefixes`, `list_keys`, `download`).
pub fn record_storage_operation(operation: &'static str, duration_secs: f64, success: bool) {
    histogram!("storage_operation_duration_seconds", "operation" => operation)
        .record(duration_secs);
    if !success {
        counter!("storage_errors_total", "operation" => operation).increment(1);
    }
}

/// Record a model call for one assistant stage.
pub fn record_provider_latency(provider: &'static str, stage: &'static str, duration_secs: f64) {
    histogram!(
        "genai_provider_latency_seconds",
        "provider" => provider,
        "stage" => stage
    )
    .record(duration_secs);
}

pub fn record_provider_error(provider: &'static str, error_type: &'static str) {
    counter!(
        "genai_provider_errors_total",
        "provider" => provider,
        "error_type" => error_type
    )
    .increment(1);
}

pub fn record_tokens(stage: &'static str, input_tokens: i32, output_tokens: i32) {
    counter!("genai_tokens_total", "stage" => stage, "type" => "input")
        .increment(input_tokens.max(0) as u64);
    counter!("genai_tokens_total", "stage" => stage, "type" => "output")
        .increment(output_tokens.max(0) as u64);
}

/// `answered` or `clarified`, plus how the carrier was resolved.
pub fn record_chat_outcome(outcome: &'static str, resolution: &'static str) {
    counter!(
        "assistant_replies_total",
        "outcome" => outcome,
        "resolution" => resolution
    )
    .increment(1);
}
