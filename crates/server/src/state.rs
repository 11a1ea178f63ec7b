//! Application State
//!
//! Shared state across all handlers. Built once at startup; nothing in it
//! changes per request.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use nira_agent::ResponseResolver;
use nira_config::{IntegrationConfig, Settings};
use nira_integrations::ContactRelay;

use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub integrations: Arc<IntegrationConfig>,
    pub resolver: Arc<ResponseResolver>,
    pub contact: Arc<ContactRelay>,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Assemble state from prebuilt parts
    pub fn new(settings: Settings, resolver: ResponseResolver, contact: ContactRelay) -> Self {
        let integrations = settings.integrations();
        Self {
            settings: Arc::new(settings),
            integrations: Arc::new(integrations),
            resolver: Arc::new(resolver),
            contact: Arc::new(contact),
            metrics: None,
        }
    }

    /// Build the resolver and relay described by `settings`
    pub fn from_settings(settings: Settings) -> Result<Self, ServerError> {
        let resolver = ResponseResolver::from_settings(&settings)?;
        let contact = ContactRelay::from_config(&settings.integrations())
            .map_err(|e| ServerError::Startup(e.to_string()))?;
        Ok(Self::new(settings, resolver, contact))
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn gemini_configured(&self) -> bool {
        self.integrations.has_credential()
    }
}
