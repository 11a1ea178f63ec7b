//! Gemini Backend
//!
//! Implements the Google Generative Language `generateContent` REST call.
//! One request per call; no streaming, no retries.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use nira_config::GenerativeConfig;

use crate::backend::{FinishReason, GenerationResult, LlmBackend};
use crate::LlmError;

/// Configuration for Gemini backend
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key
    pub api_key: String,
    /// Model ID, e.g. `gemini-2.5-flash`
    pub model: String,
    /// Maximum tokens to generate
    pub max_output_tokens: u32,
    /// Temperature (0.0 - 2.0)
    pub temperature: f32,
    /// Request timeout. `None` keeps the reqwest default.
    pub timeout: Option<Duration>,
    /// API base URL (for testing or proxy)
    pub endpoint: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        let generative = GenerativeConfig::default();
        Self {
            api_key: String::new(),
            model: generative.model,
            max_output_tokens: generative.max_output_tokens,
            temperature: generative.temperature,
            timeout: None,
            endpoint: generative.endpoint,
        }
    }
}

impl GeminiConfig {
    /// Create config with API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Build from the `generative` settings section
    pub fn from_settings(api_key: impl Into<String>, settings: &GenerativeConfig) -> Self {
        Self {
            api_key: api_key.into(),
            model: settings.model.clone(),
            max_output_tokens: settings.max_output_tokens,
            temperature: settings.temperature,
            timeout: settings.timeout_seconds.map(Duration::from_secs),
            endpoint: settings.endpoint.clone(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Gemini backend
pub struct GeminiBackend {
    config: GeminiConfig,
    client: Client,
}

impl GeminiBackend {
    /// Create a new Gemini backend
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Configuration(
                "GEMINI_API_KEY not set. Set it via environment or config.".to_string(),
            ));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request(&self, prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(self.config.temperature),
                max_output_tokens: Some(self.config.max_output_tokens),
            }),
        }
    }

    fn parse_response(response: GeminiResponse) -> Result<(String, FinishReason), LlmError> {
        let candidate = match response.candidates.into_iter().next() {
            Some(c) => c,
            None => {
                let reason = response
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .map(|r| format!("prompt blocked: {}", r))
                    .unwrap_or_else(|| "no candidates returned".to_string());
                return Err(LlmError::InvalidResponse(reason));
            },
        };

        let finish_reason = FinishReason::from_gemini(candidate.finish_reason.as_deref());
        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::InvalidResponse(format!(
                "empty candidate (finish reason {:?})",
                finish_reason
            )));
        }

        Ok((text, finish_reason))
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult, LlmError> {
        let start = Instant::now();
        let request = self.build_request(prompt);

        let response = self
            .client
            .post(self.api_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => LlmError::Quota(error_text),
                s if s.is_server_error() => {
                    LlmError::Network(format!("Server error {}: {}", s, error_text))
                },
                s => LlmError::Api(format!("HTTP {}: {}", s, error_text)),
            });
        }

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let (text, finish_reason) = Self::parse_response(body)?;
        let total_time_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            model = %self.config.model,
            total_time_ms,
            ?finish_reason,
            "Gemini generation complete"
        );

        Ok(GenerationResult {
            text,
            total_time_ms,
            finish_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> GeminiBackend {
        GeminiBackend::new(GeminiConfig::new("test-key")).unwrap()
    }

    #[test]
    fn test_missing_key_rejected() {
        assert!(matches!(
            GeminiBackend::new(GeminiConfig::new("  ")),
            Err(LlmError::Configuration(_))
        ));
    }

    #[test]
    fn test_config_from_settings() {
        let mut settings = GenerativeConfig::default();
        settings.model = "gemini-2.0-flash".to_string();
        settings.timeout_seconds = Some(15);

        let config = GeminiConfig::from_settings("key", &settings);
        assert_eq!(config.api_key, "key");
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));

        assert!(GeminiConfig::new("key").timeout.is_none());
    }

    #[test]
    fn test_api_url() {
        let backend = GeminiBackend::new(
            GeminiConfig::new("k")
                .with_endpoint("http://localhost:8090/")
                .with_model("gemini-test"),
        )
        .unwrap();
        assert_eq!(
            backend.api_url(),
            "http://localhost:8090/v1beta/models/gemini-test:generateContent"
        );
        assert_eq!(backend.model_name(), "gemini-test");
    }

    #[test]
    fn test_request_serialization() {
        let request = backend().build_request("User: hi\nAssistant:");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "User: hi\nAssistant:");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1024);
        assert!(json["generationConfig"]["temperature"].is_number());
    }

    #[test]
    fn test_parse_response_joins_parts() {
        let body: GeminiResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "there"}]},
                    "finishReason": "STOP"
                }]
            }"#,
        )
        .unwrap();

        let (text, reason) = GeminiBackend::parse_response(body).unwrap();
        assert_eq!(text, "Hello there");
        assert_eq!(reason, FinishReason::Stop);
    }

    #[test]
    fn test_parse_blocked_prompt() {
        let body: GeminiResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();

        match GeminiBackend::parse_response(body) {
            Err(LlmError::InvalidResponse(msg)) => assert!(msg.contains("SAFETY")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_candidate() {
        let body: GeminiResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert!(GeminiBackend::parse_response(body).is_err());
    }

    /// Serve a fixed reply on a local port; requests without the expected key get 401
    async fn stub_endpoint(status: u16, body: &'static str) -> String {
        let status = axum::http::StatusCode::from_u16(status).unwrap();
        let app = axum::Router::new().fallback(move |headers: axum::http::HeaderMap| async move {
            let key = headers.get("x-goog-api-key").and_then(|v| v.to_str().ok());
            if key != Some("k") {
                return (axum::http::StatusCode::UNAUTHORIZED, "missing key");
            }
            (status, body)
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn generate_against(
        status: u16,
        body: &'static str,
    ) -> Result<GenerationResult, LlmError> {
        let endpoint = stub_endpoint(status, body).await;
        let backend = GeminiBackend::new(
            GeminiConfig::new("k")
                .with_endpoint(endpoint)
                .with_timeout(Duration::from_secs(5)),
        )
        .unwrap();
        backend.generate("User: hi\nAssistant:").await
    }

    #[tokio::test]
    async fn test_generate_decodes_candidate() {
        let result = generate_against(
            200,
            r#"{"candidates": [{"content": {"parts": [{"text": "Hi from Nira"}]}, "finishReason": "STOP"}]}"#,
        )
        .await
        .unwrap();
        assert_eq!(result.text, "Hi from Nira");
        assert_eq!(result.finish_reason, FinishReason::Stop);
    }

    #[tokio::test]
    async fn test_generate_status_mapping() {
        match generate_against(429, "quota exhausted").await {
            Err(LlmError::Quota(body)) => assert_eq!(body, "quota exhausted"),
            other => panic!("expected quota error, got {:?}", other),
        }
        match generate_against(500, "backend down").await {
            Err(LlmError::Network(msg)) => {
                assert!(msg.contains("500") && msg.contains("backend down"))
            },
            other => panic!("expected network error, got {:?}", other),
        }
        match generate_against(403, "forbidden").await {
            Err(LlmError::Api(msg)) => {
                assert!(msg.contains("403") && msg.contains("forbidden"))
            },
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_garbage_body_is_invalid_response() {
        let result = generate_against(200, "<html>not json</html>").await;
        assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let backend = GeminiBackend::new(
            GeminiConfig::new("k")
                .with_endpoint("http://127.0.0.1:1")
                .with_timeout(Duration::from_secs(2)),
        )
        .unwrap();

        let result = backend.generate("hello").await;
        assert!(matches!(
            result,
            Err(LlmError::Network(_)) | Err(LlmError::Timeout)
        ));
    }
}
