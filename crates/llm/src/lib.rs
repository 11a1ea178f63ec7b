//! Generative-text integration for the chat responder
//!
//! Features:
//! - `LlmBackend` trait so the resolver can take any backend (or a test fake)
//! - Gemini `generateContent` backend
//! - Persona prompt construction with bounded history

pub mod backend;
pub mod gemini;
pub mod prompt;

pub use backend::{FinishReason, GenerationResult, LlmBackend};
pub use gemini::{GeminiBackend, GeminiConfig};
pub use prompt::{PromptBuilder, NIRA_SYSTEM_PROMPT};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Quota exceeded: {0}")]
    Quota(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for nira_core::Error {
    fn from(err: LlmError) -> Self {
        nira_core::Error::Llm(err.to_string())
    }
}
