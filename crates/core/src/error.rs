//! Error types shared across crates

use thiserror::Error;

/// Core error type
///
/// Each crate has its own error enum and converts into this one at crate
/// boundaries.
#[derive(Error, Debug)]
pub enum Error {
    /// Required user input missing or malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Remote generative-text service failed
    #[error("LLM error: {0}")]
    Llm(String),

    /// Outbound CRM webhook failed
    #[error("Integration error: {0}")]
    Integration(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
