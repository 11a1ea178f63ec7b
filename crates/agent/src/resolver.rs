//! Response resolution
//!
//! Classify, try the generative backend once, fall back to a canned reply.
//! Upstream failures never reach the caller.

use std::sync::Arc;
use std::time::Instant;

use nira_config::Settings;
use nira_core::{InboundMessage, ReplyResult};
use nira_llm::{GeminiBackend, GeminiConfig, LlmBackend, LlmError, PromptBuilder};

use crate::fallback::FallbackBank;
use crate::lead::LeadClassifier;

/// Why a canned reply was used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No credential, so no backend was built
    Unconfigured,
    /// The backend returned an error
    UpstreamError,
    /// The backend succeeded with blank text
    EmptyReply,
}

/// Where a reply came from. Server-side only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Generated,
    Fallback(FallbackReason),
}

impl ReplySource {
    /// Metric label
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplySource::Generated => "generated",
            ReplySource::Fallback(FallbackReason::Unconfigured) => "fallback_unconfigured",
            ReplySource::Fallback(FallbackReason::UpstreamError) => "fallback_upstream_error",
            ReplySource::Fallback(FallbackReason::EmptyReply) => "fallback_empty_reply",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ReplySource::Fallback(_))
    }
}

/// Resolved reply plus its provenance
#[derive(Debug, Clone)]
pub struct Resolution {
    pub result: ReplyResult,
    pub source: ReplySource,
    /// Latency of the remote call, when one was made
    pub llm_latency_ms: Option<u64>,
}

/// Produces replies for inbound chat messages
pub struct ResponseResolver {
    classifier: LeadClassifier,
    fallback: FallbackBank,
    backend: Option<Arc<dyn LlmBackend>>,
    prompt: PromptBuilder,
}

impl ResponseResolver {
    /// Resolver with no backend; every reply is canned
    pub fn offline() -> Self {
        Self {
            classifier: LeadClassifier::new(),
            fallback: FallbackBank::new(),
            backend: None,
            prompt: PromptBuilder::default(),
        }
    }

    /// Resolver backed by `backend`
    pub fn with_backend(backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            backend: Some(backend),
            ..Self::offline()
        }
    }

    /// Build from settings. A missing credential yields an offline resolver.
    pub fn from_settings(settings: &Settings) -> Result<Self, LlmError> {
        let integrations = settings.integrations();
        let prompt = PromptBuilder::from_override(settings.generative.system_prompt.clone());

        let resolver = match integrations.generative_service_credential {
            Some(key) => {
                let config = GeminiConfig::from_settings(key, &settings.generative);
                let backend = GeminiBackend::new(config)?;
                tracing::info!(model = %backend.model_name(), "Generative backend configured");
                Self::with_backend(Arc::new(backend))
            },
            None => Self::offline(),
        };

        Ok(resolver.with_prompt(prompt))
    }

    pub fn with_prompt(mut self, prompt: PromptBuilder) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackBank) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    pub fn classifier(&self) -> &LeadClassifier {
        &self.classifier
    }

    /// Resolve a reply for `message`
    pub async fn resolve(&self, message: &InboundMessage) -> Resolution {
        let matched = self.classifier.first_match(&message.text);
        if let Some(pattern) = matched {
            tracing::debug!(pattern, "Potential lead detected");
        }
        let is_lead = matched.is_some();

        let Some(backend) = &self.backend else {
            return self.canned(message, is_lead, FallbackReason::Unconfigured, None);
        };

        let prompt = self.prompt.build(message);
        let start = Instant::now();
        let outcome = backend.generate(&prompt).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(generation) if !generation.text.trim().is_empty() => Resolution {
                result: ReplyResult::now(generation.text, is_lead),
                source: ReplySource::Generated,
                llm_latency_ms: Some(latency_ms),
            },
            Ok(generation) => {
                tracing::warn!(
                    model = %backend.model_name(),
                    finish_reason = ?generation.finish_reason,
                    "Generative backend returned blank text, using canned reply"
                );
                self.canned(message, is_lead, FallbackReason::EmptyReply, Some(latency_ms))
            },
            Err(e) => {
                tracing::warn!(
                    model = %backend.model_name(),
                    error = %e,
                    latency_ms,
                    "Generative backend failed, using canned reply"
                );
                self.canned(message, is_lead, FallbackReason::UpstreamError, Some(latency_ms))
            },
        }
    }

    fn canned(
        &self,
        message: &InboundMessage,
        is_lead: bool,
        reason: FallbackReason,
        llm_latency_ms: Option<u64>,
    ) -> Resolution {
        Resolution {
            result: ReplyResult::now(self.fallback.fallback(&message.text), is_lead),
            source: ReplySource::Fallback(reason),
            llm_latency_ms,
        }
    }
}
