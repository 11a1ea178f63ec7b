//! Contact relay
//!
//! Forwards submissions to the configured sink. Delivery problems are logged
//! and reported as an outcome, never as an error to the HTTP caller.

use std::sync::Arc;

use nira_config::IntegrationConfig;

use crate::contact::ContactSubmission;
use crate::webhook::{HttpWebhook, WebhookSink};
use crate::IntegrationError;

/// What happened to one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Delivered,
    /// No webhook URL configured
    Skipped,
    Failed,
}

impl RelayOutcome {
    /// Metric label
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayOutcome::Delivered => "delivered",
            RelayOutcome::Skipped => "skipped",
            RelayOutcome::Failed => "failed",
        }
    }
}

/// Relays contact submissions to the CRM
pub struct ContactRelay {
    sink: Option<Arc<dyn WebhookSink>>,
}

impl ContactRelay {
    /// Relay that drops every submission
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn with_sink(sink: Arc<dyn WebhookSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Build from the integration options. An empty URL disables forwarding.
    pub fn from_config(config: &IntegrationConfig) -> Result<Self, IntegrationError> {
        if !config.has_webhook() {
            return Ok(Self::disabled());
        }
        let hook = HttpWebhook::new(config.webhook_url.clone())?;
        Ok(Self::with_sink(Arc::new(hook)))
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Forward one submission
    pub async fn relay(&self, submission: &ContactSubmission) -> RelayOutcome {
        let Some(sink) = &self.sink else {
            tracing::warn!("Webhook URL not configured, contact submission not forwarded");
            return RelayOutcome::Skipped;
        };

        match sink.deliver(&submission.to_payload()).await {
            Ok(()) => {
                tracing::info!(fields = submission.fields().len(), "Contact submission forwarded");
                RelayOutcome::Delivered
            },
            Err(e) => {
                tracing::warn!(error = %e, "Contact webhook delivery failed");
                RelayOutcome::Failed
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::RequestMetadata;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::{json, Value};

    #[derive(Default)]
    struct RecordingSink {
        payloads: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl WebhookSink for RecordingSink {
        async fn deliver(&self, payload: &Value) -> Result<(), IntegrationError> {
            self.payloads.lock().push(payload.clone());
            Ok(())
        }
    }

    struct RejectingSink;

    #[async_trait]
    impl WebhookSink for RejectingSink {
        async fn deliver(&self, _payload: &Value) -> Result<(), IntegrationError> {
            Err(IntegrationError::Rejected {
                status: 500,
                body: "boom".to_string(),
            })
        }
    }

    fn submission() -> ContactSubmission {
        ContactSubmission::from_json(
            json!({"name": "Dr. Lee", "organization": "Clinic"}),
            &RequestMetadata::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_delivers_payload_with_metadata() {
        let sink = Arc::new(RecordingSink::default());
        let relay = ContactRelay::with_sink(sink.clone());

        assert_eq!(relay.relay(&submission()).await, RelayOutcome::Delivered);

        let payloads = sink.payloads.lock();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0]["name"], "Dr. Lee");
        assert_eq!(payloads[0]["referrer"], "Direct");
        assert!(payloads[0]["receivedAt"].is_string());
    }

    #[tokio::test]
    async fn test_failure_is_absorbed() {
        let relay = ContactRelay::with_sink(Arc::new(RejectingSink));
        assert_eq!(relay.relay(&submission()).await, RelayOutcome::Failed);
    }

    #[tokio::test]
    async fn test_unconfigured_skips() {
        let relay = ContactRelay::from_config(&IntegrationConfig::new(None, "")).unwrap();
        assert!(!relay.is_enabled());
        assert_eq!(relay.relay(&submission()).await, RelayOutcome::Skipped);
    }

    #[test]
    fn test_configured_url_enables_relay() {
        let config = IntegrationConfig::new(None, "https://hooks.zapier.com/hooks/catch/1/abc/");
        assert!(ContactRelay::from_config(&config).unwrap().is_enabled());
    }
}
