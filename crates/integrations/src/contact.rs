//! Contact-form submissions
//!
//! The form fields are forwarded verbatim. A few metadata keys are derived
//! from the request when the browser did not send them.

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::IntegrationError;

/// Referrer recorded when the request carries none
pub const DIRECT_REFERRER: &str = "Direct";

/// Request details the HTTP layer hands to the relay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMetadata {
    pub user_agent: Option<String>,
    pub accept_language: Option<String>,
    pub referer: Option<String>,
}

impl RequestMetadata {
    /// First language tag of an `Accept-Language` header, without its q-value
    pub fn primary_language(&self) -> Option<String> {
        self.accept_language
            .as_deref()?
            .split(',')
            .next()
            .and_then(|tag| tag.split(';').next())
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
    }
}

/// One contact-form submission ready for delivery
#[derive(Debug, Clone, PartialEq)]
pub struct ContactSubmission {
    fields: Map<String, Value>,
}

impl ContactSubmission {
    /// Build from a JSON body. Anything but an object is rejected.
    pub fn from_json(body: Value, metadata: &RequestMetadata) -> Result<Self, IntegrationError> {
        match body {
            Value::Object(fields) => Ok(Self::from_form(fields, metadata)),
            other => Err(IntegrationError::InvalidRequest(format!(
                "contact body must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Fill missing metadata keys and stamp `receivedAt`
    pub fn from_form(mut fields: Map<String, Value>, metadata: &RequestMetadata) -> Self {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        fill_missing(&mut fields, "submittedAt", Some(now.clone()));
        fill_missing(&mut fields, "userAgent", metadata.user_agent.clone());
        fill_missing(&mut fields, "language", metadata.primary_language());
        fill_missing(
            &mut fields,
            "referrer",
            Some(
                metadata
                    .referer
                    .clone()
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| DIRECT_REFERRER.to_string()),
            ),
        );
        fields.insert("receivedAt".to_string(), Value::String(now));

        Self { fields }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Payload posted to the webhook
    pub fn to_payload(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

fn fill_missing(fields: &mut Map<String, Value>, key: &str, value: Option<String>) {
    let present = matches!(fields.get(key), Some(v) if !v.is_null());
    if present {
        return;
    }
    if let Some(value) = value {
        fields.insert(key.to_string(), Value::String(value));
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn browser() -> RequestMetadata {
        RequestMetadata {
            user_agent: Some("Mozilla/5.0".to_string()),
            accept_language: Some("en-US,en;q=0.9".to_string()),
            referer: Some("https://nira.example/pricing".to_string()),
        }
    }

    #[test]
    fn test_metadata_filled_from_request() {
        let body = json!({"name": "Dr. Rao", "email": "rao@clinic.example"});
        let submission = ContactSubmission::from_json(body, &browser()).unwrap();

        assert_eq!(submission.get("name").unwrap(), "Dr. Rao");
        assert_eq!(submission.get("userAgent").unwrap(), "Mozilla/5.0");
        assert_eq!(submission.get("language").unwrap(), "en-US");
        assert_eq!(submission.get("referrer").unwrap(), "https://nira.example/pricing");
        assert!(submission.get("submittedAt").unwrap().is_string());
        assert!(submission.get("receivedAt").unwrap().is_string());
    }

    #[test]
    fn test_client_metadata_wins() {
        let body = json!({
            "name": "A",
            "userAgent": "client-ua",
            "referrer": "https://search.example",
            "submittedAt": "2024-01-01T00:00:00.000Z",
            "screenWidth": 1920,
            "timeZone": "America/New_York"
        });
        let submission = ContactSubmission::from_json(body, &browser()).unwrap();

        assert_eq!(submission.get("userAgent").unwrap(), "client-ua");
        assert_eq!(submission.get("referrer").unwrap(), "https://search.example");
        assert_eq!(submission.get("submittedAt").unwrap(), "2024-01-01T00:00:00.000Z");
        assert_eq!(submission.get("screenWidth").unwrap(), 1920);
        assert_eq!(submission.get("timeZone").unwrap(), "America/New_York");
    }

    #[test]
    fn test_missing_referer_is_direct() {
        let submission = ContactSubmission::from_form(Map::new(), &RequestMetadata::default());
        assert_eq!(submission.get("referrer").unwrap(), DIRECT_REFERRER);
        assert!(submission.get("userAgent").is_none());
        assert!(submission.get("language").is_none());
    }

    #[test]
    fn test_non_object_rejected() {
        let meta = RequestMetadata::default();
        assert!(ContactSubmission::from_json(json!([1, 2]), &meta).is_err());
        assert!(ContactSubmission::from_json(json!("hi"), &meta).is_err());
        assert!(ContactSubmission::from_json(Value::Null, &meta).is_err());
    }

    #[test]
    fn test_primary_language() {
        let meta = RequestMetadata {
            accept_language: Some("fr-CA;q=0.8, en".to_string()),
            ..Default::default()
        };
        assert_eq!(meta.primary_language().as_deref(), Some("fr-CA"));

        let meta = RequestMetadata {
            accept_language: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(meta.primary_language().is_none());
    }
}
