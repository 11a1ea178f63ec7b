//! Prometheus metrics

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use nira_agent::ReplySource;
use nira_integrations::RelayOutcome;

use crate::state::AppState;

pub const CHAT_REQUESTS_TOTAL: &str = "nira_chat_requests_total";
pub const CHAT_REPLIES_TOTAL: &str = "nira_chat_replies_total";
pub const LEADS_DETECTED_TOTAL: &str = "nira_leads_detected_total";
pub const LLM_LATENCY_MS: &str = "nira_llm_latency_ms";
pub const CONTACT_SUBMISSIONS_TOTAL: &str = "nira_contact_submissions_total";

/// Install the global Prometheus recorder
///
/// Fails if a recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

pub fn record_chat_request() {
    counter!(CHAT_REQUESTS_TOTAL).increment(1);
}

pub fn record_reply(source: ReplySource, is_potential_lead: bool) {
    counter!(CHAT_REPLIES_TOTAL, "source" => source.as_str()).increment(1);
    if is_potential_lead {
        counter!(LEADS_DETECTED_TOTAL).increment(1);
    }
}

pub fn record_llm_latency(latency_ms: u64) {
    histogram!(LLM_LATENCY_MS).record(latency_ms as f64);
}

pub fn record_contact_submission(outcome: RelayOutcome) {
    counter!(CONTACT_SUBMISSIONS_TOTAL, "outcome" => outcome.as_str()).increment(1);
}

/// `GET /metrics`
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}
