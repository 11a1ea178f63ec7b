//! Configuration management for the Nira assistant backend
//!
//! Supports loading configuration from:
//! - YAML/TOML files under `config/`
//! - Environment variables (`NIRA__` prefix)
//! - The platform variables `GEMINI_API_KEY`, `GEMINI_MODEL`, `ZAPIER_WEBHOOK_URL`, `PORT`

pub mod integration;
pub mod settings;

pub use integration::{redact_credential, IntegrationConfig, NOT_SET};
pub use settings::{
    load_settings, load_settings_from, GenerativeConfig, ObservabilityConfig, RuntimeEnvironment,
    ServerConfig, Settings, WebhookConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for nira_core::Error {
    fn from(err: ConfigError) -> Self {
        nira_core::Error::Config(err.to_string())
    }
}
