//! Nira Server
//!
//! Provides the chat, contact and diagnostic HTTP endpoints.

pub mod http;
pub mod metrics;
pub mod state;

pub use http::create_router;
pub use metrics::{
    init_metrics, record_chat_request, record_contact_submission, record_llm_latency,
    record_reply,
};
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Startup error: {0}")]
    Startup(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ServerError::Startup(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Message sent to the client. Internal details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            ServerError::Startup(_) | ServerError::Internal(_) => {
                "Internal server error".to_string()
            },
            other => other.to_string(),
        }
    }
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        err.status()
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if let ServerError::Internal(detail) = &self {
            tracing::error!(error = %detail, "Request failed");
        }
        let body = serde_json::json!({ "error": self.public_message() });
        (self.status(), Json(body)).into_response()
    }
}

impl From<nira_llm::LlmError> for ServerError {
    fn from(err: nira_llm::LlmError) -> Self {
        ServerError::Startup(err.to_string())
    }
}

impl From<nira_integrations::IntegrationError> for ServerError {
    fn from(err: nira_integrations::IntegrationError) -> Self {
        if err.is_client_error() {
            ServerError::InvalidRequest(err.to_string())
        } else {
            ServerError::Internal(err.to_string())
        }
    }
}
