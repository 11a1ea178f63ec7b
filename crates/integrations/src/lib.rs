//! External system integrations
//!
//! Contact-form submissions are relayed to a CRM catch hook. Delivery is
//! best effort: the relay reports an outcome and never fails the caller.

pub mod contact;
pub mod relay;
pub mod webhook;

pub use contact::{ContactSubmission, RequestMetadata, DIRECT_REFERRER};
pub use relay::{ContactRelay, RelayOutcome};
pub use webhook::{HttpWebhook, WebhookSink};

use thiserror::Error;

/// Integration errors
#[derive(Error, Debug)]
pub enum IntegrationError {
    #[error("Webhook URL not configured")]
    NotConfigured,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Webhook rejected payload with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntegrationError {
    /// Failures caused by the client's input rather than the webhook
    pub fn is_client_error(&self) -> bool {
        matches!(self, IntegrationError::InvalidRequest(_))
    }
}

impl From<IntegrationError> for nira_core::Error {
    fn from(err: IntegrationError) -> Self {
        match err {
            IntegrationError::InvalidRequest(msg) => nira_core::Error::Validation(msg),
            other => nira_core::Error::Integration(other.to_string()),
        }
    }
}
