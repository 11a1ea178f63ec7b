//! HTTP Endpoints
//!
//! REST API for the chat widget and contact form.

use std::any::Any;

use axum::{
    body::Bytes,
    extract::{Json, State},
    http::{header, HeaderMap, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Router,
};
use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use nira_core::{HistoryEntry, InboundMessage, ReplyResult, UserContext};
use nira_integrations::{ContactSubmission, RequestMetadata};

use crate::metrics::{
    metrics_handler, record_chat_request, record_contact_submission, record_llm_latency,
    record_reply,
};
use crate::state::AppState;
use crate::ServerError;

const SERVICE_BANNER: &str = "Nira AI Chatbot Backend";

const ENDPOINTS: [&str; 5] = ["/api/chat", "/api/contact", "/api/health", "/api/verify", "/api/test"];

/// Request headers the widget and form may send
const ALLOWED_HEADERS: [&str; 9] = [
    "x-csrf-token",
    "x-requested-with",
    "accept",
    "accept-version",
    "content-length",
    "content-md5",
    "content-type",
    "date",
    "x-api-version",
];

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route(
            "/api/chat",
            post(chat).options(preflight).fallback(method_not_allowed),
        )
        .route(
            "/api/contact",
            post(contact).options(preflight).fallback(method_not_allowed),
        )
        .route("/api/health", get(health_check))
        .route("/api/verify", get(verify))
        .route("/api/test", any(test_endpoint))
        .route("/metrics", get(metrics_handler))
        // Innermost, so CORS headers are still added to the 500
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
        .with_state(state)
}

/// Any origin, no credentials
fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([
            Method::GET,
            Method::OPTIONS,
            Method::PATCH,
            Method::DELETE,
            Method::POST,
            Method::PUT,
        ])
        .allow_headers(ALLOWED_HEADERS.map(HeaderName::from_static))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    ServerError::Internal(detail).into_response()
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> ServerError {
    ServerError::MethodNotAllowed
}

/// Decode a JSON body regardless of its Content-Type
///
/// Browsers post `text/plain` to skip preflight and curl defaults to a form
/// type, so the header is not checked. An empty body decodes as `empty`.
fn decode_body<T: DeserializeOwned>(
    body: &Bytes,
    empty: T,
    route: &'static str,
) -> Result<T, ServerError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(empty);
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(route, error = %e, "Rejected request body");
        ServerError::InvalidRequest("Invalid request body".to_string())
    })
}

/// Chat request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    history: Option<Vec<HistoryEntry>>,
    #[serde(default)]
    user_context: Option<UserContext>,
}

impl ChatRequest {
    fn into_message(self) -> Result<InboundMessage, ServerError> {
        let text = self
            .message
            .filter(|m| !m.is_empty())
            .ok_or_else(|| ServerError::InvalidRequest("Message is required".to_string()))?;

        Ok(InboundMessage::new(text)
            .with_history(self.history.unwrap_or_default())
            .with_user_context(self.user_context.unwrap_or_default()))
    }
}

/// Chat endpoint
async fn chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ReplyResult>, ServerError> {
    let request: ChatRequest = decode_body(&body, ChatRequest::default(), "chat")?;
    let message = request.into_message()?;

    record_chat_request();
    let resolution = state.resolver.resolve(&message).await;

    record_reply(resolution.source, resolution.result.is_potential_lead);
    if let Some(latency_ms) = resolution.llm_latency_ms {
        record_llm_latency(latency_ms);
    }

    tracing::info!(
        source = resolution.source.as_str(),
        is_potential_lead = resolution.result.is_potential_lead,
        history_len = message.history.len(),
        "Chat reply resolved"
    );

    Ok(Json(resolution.result))
}

fn header_string(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn request_metadata(headers: &HeaderMap) -> RequestMetadata {
    RequestMetadata {
        user_agent: header_string(headers, header::USER_AGENT),
        accept_language: header_string(headers, header::ACCEPT_LANGUAGE),
        referer: header_string(headers, header::REFERER),
    }
}

/// Contact form endpoint
///
/// Reports success whether or not the webhook accepted the payload.
async fn contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ServerError> {
    let body: serde_json::Value = decode_body(&body, serde_json::Value::Null, "contact")?;

    let submission = ContactSubmission::from_json(body, &request_metadata(&headers))?;
    let outcome = state.contact.relay(&submission).await;
    record_contact_submission(outcome);

    Ok(Json(serde_json::json!({ "success": true })))
}

/// Health check
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "gemini_configured": state.gemini_configured(),
    }))
}

/// Deployment check with a redacted credential prefix
async fn verify(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "environment": {
            "environment": state.settings.environment.as_str(),
            "hasGeminiApiKey": state.integrations.has_credential(),
            "geminiApiKeyPrefix": state.integrations.credential_prefix(),
        },
    }))
}

async fn test_endpoint(State(state): State<AppState>, method: Method) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Test endpoint working",
        "hasApiKey": state.integrations.has_credential(),
        "apiKeyPrefix": state.integrations.credential_prefix(),
        "method": method.as_str(),
    }))
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": SERVICE_BANNER,
        "status": "running",
        "endpoints": ENDPOINTS,
    }))
}
