//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::integration::IntegrationConfig;
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Remote generative-text service (Gemini)
    #[serde(default)]
    pub generative: GenerativeConfig,

    /// CRM webhook for contact-form submissions
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// The explicit integration options handed to the resolver and relay
    pub fn integrations(&self) -> IntegrationConfig {
        IntegrationConfig::new(self.generative.api_key.clone(), self.webhook.url.clone())
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_generative()?;
        self.validate_webhook()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if self.server.host.trim().is_empty() {
            return Err(ConfigError::MissingField("server.host".to_string()));
        }

        Ok(())
    }

    fn validate_generative(&self) -> Result<(), ConfigError> {
        let generative = &self.generative;

        if generative.model.trim().is_empty() {
            return Err(ConfigError::MissingField("generative.model".to_string()));
        }

        if !is_http_url(&generative.endpoint) {
            return Err(ConfigError::InvalidValue {
                field: "generative.endpoint".to_string(),
                message: format!("Must be an http(s) URL, got '{}'", generative.endpoint),
            });
        }

        if !(0.0..=2.0).contains(&generative.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "generative.temperature".to_string(),
                message: format!("Must be between 0.0 and 2.0, got {}", generative.temperature),
            });
        }

        if generative.timeout_seconds == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "generative.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second when set".to_string(),
            });
        }

        // Missing credential only degrades chat to canned replies
        if !self.integrations().has_credential() {
            if self.environment.is_production() {
                tracing::warn!("GEMINI_API_KEY not set in production, chat will use canned replies");
            } else {
                tracing::info!("GEMINI_API_KEY not set, chat will use canned replies");
            }
        }

        Ok(())
    }

    fn validate_webhook(&self) -> Result<(), ConfigError> {
        let url = self.webhook.url.trim();
        if url.is_empty() {
            tracing::warn!("Webhook URL not configured, contact submissions will not be forwarded");
            return Ok(());
        }

        if !is_http_url(url) {
            return Err(ConfigError::InvalidValue {
                field: "webhook.url".to_string(),
                message: format!("Must be an http(s) URL, got '{}'", url),
            });
        }

        Ok(())
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Generative-text service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerativeConfig {
    /// API key; absent means fallback-only mode
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model ID
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout. Unset leaves the HTTP client default in place.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Replaces the built-in persona prompt when set
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    1024
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_seconds: None,
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            system_prompt: None,
        }
    }
}

/// CRM webhook configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WebhookConfig {
    /// Catch-hook URL; empty disables forwarding
    #[serde(default)]
    pub url: String,
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,

    /// Expose Prometheus metrics at /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. `GEMINI_API_KEY`, `GEMINI_MODEL`, `ZAPIER_WEBHOOK_URL`, `PORT`
/// 2. Environment variables (`NIRA__` prefix, `__` separator)
/// 3. config/{env}.yaml (if env specified)
/// 4. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Same as [`load_settings`] with an explicit config directory
pub fn load_settings_from(config_dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::from(config_dir.join("default")).required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::from(config_dir.join(env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("NIRA")
            .separator("__")
            .try_parsing(true),
    );

    // Well-known variables used by the hosting platform
    builder = builder
        .set_override_option("generative.api_key", non_empty_env("GEMINI_API_KEY"))?
        .set_override_option("generative.model", non_empty_env("GEMINI_MODEL"))?
        .set_override_option("webhook.url", non_empty_env("ZAPIER_WEBHOOK_URL"))?
        .set_override_option(
            "server.port",
            non_empty_env("PORT").and_then(|p| p.parse::<i64>().ok()),
        )?;

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
