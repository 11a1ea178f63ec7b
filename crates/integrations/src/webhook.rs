//! CRM webhook delivery

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::IntegrationError;

/// Response bodies longer than this are cut in error messages
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Destination for contact payloads
///
/// Implement this trait to forward submissions somewhere other than an HTTP hook.
#[async_trait]
pub trait WebhookSink: Send + Sync {
    /// Deliver one payload
    async fn deliver(&self, payload: &Value) -> Result<(), IntegrationError>;
}

/// Posts JSON to a catch-hook URL (Zapier and similar)
pub struct HttpWebhook {
    url: String,
    client: Client,
}

impl HttpWebhook {
    pub fn new(url: impl Into<String>) -> Result<Self, IntegrationError> {
        Self::build(url.into(), None)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, IntegrationError> {
        Self::build(url.into(), Some(timeout))
    }

    fn build(url: String, timeout: Option<Duration>) -> Result<Self, IntegrationError> {
        if url.trim().is_empty() {
            return Err(IntegrationError::NotConfigured);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| IntegrationError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { url, client })
    }
}

#[async_trait]
impl WebhookSink for HttpWebhook {
    async fn deliver(&self, payload: &Value) -> Result<(), IntegrationError> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| IntegrationError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(IntegrationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(status = status.as_u16(), "Webhook accepted payload");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_url_not_configured() {
        assert!(matches!(HttpWebhook::new("  "), Err(IntegrationError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_unreachable_hook_is_connection_error() {
        let hook = HttpWebhook::with_timeout("http://127.0.0.1:1/hook", Duration::from_secs(2)).unwrap();

        let result = hook.deliver(&json!({"name": "x"})).await;
        assert!(matches!(result, Err(IntegrationError::ConnectionFailed(_))));
    }
}
