//! Integration options passed to the chat resolver and contact relay at construction time

/// Shown in diagnostics when no credential is configured
pub const NOT_SET: &str = "NOT SET";

/// Upper bound on credential characters revealed by diagnostics
const MAX_PREFIX_CHARS: usize = 10;

/// Explicit configuration for the two outbound integrations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrationConfig {
    /// Gemini API key. `None` puts chat in fallback-only mode.
    pub generative_service_credential: Option<String>,
    /// CRM catch-hook URL. Empty disables forwarding.
    pub webhook_url: String,
}

impl IntegrationConfig {
    /// Blank credentials are normalized to `None`
    pub fn new(credential: Option<String>, webhook_url: impl Into<String>) -> Self {
        Self {
            generative_service_credential: credential
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            webhook_url: webhook_url.into().trim().to_string(),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.generative_service_credential.is_some()
    }

    pub fn has_webhook(&self) -> bool {
        !self.webhook_url.is_empty()
    }

    /// Redacted credential prefix for diagnostic endpoints
    pub fn credential_prefix(&self) -> String {
        redact_credential(self.generative_service_credential.as_deref())
    }
}

/// Reveal at most half of the credential, capped at ten characters
pub fn redact_credential(credential: Option<&str>) -> String {
    match credential {
        Some(key) if !key.is_empty() => {
            let total = key.chars().count();
            let shown = (total / 2).min(MAX_PREFIX_CHARS);
            let prefix: String = key.chars().take(shown).collect();
            format!("{}...", prefix)
        },
        _ => NOT_SET.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_credential_is_absent() {
        let config = IntegrationConfig::new(Some("   ".to_string()), "");
        assert!(!config.has_credential());
        assert!(!config.has_webhook());
        assert_eq!(config.credential_prefix(), NOT_SET);
    }

    #[test]
    fn test_prefix_capped_at_ten() {
        let config = IntegrationConfig::new(
            Some("AIzaSyD-0123456789abcdefghij".to_string()),
            "https://hooks.example.com/catch",
        );
        assert_eq!(config.credential_prefix(), "AIzaSyD-01...");
        assert!(config.has_webhook());
    }

    #[test]
    fn test_short_credential_never_revealed_in_full() {
        let prefix = redact_credential(Some("abcdef"));
        assert_eq!(prefix, "abc...");

        let prefix = redact_credential(Some("k"));
        assert_eq!(prefix, "...");
    }
}
