//! Lead classification
//!
//! A message is a potential lead when any purchase-intent pattern matches.
//! Patterns are checked in order and the first hit wins.

use once_cell::sync::Lazy;
use regex::Regex;

// Broad on purpose: "how many employees" or "recall" still count
static LEAD_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)contact.*sales", "contact_sales"),
        (r"(?i)pricing", "pricing"),
        (r"(?i)demo", "demo"),
        (r"(?i)quote", "quote"),
        (r"(?i)interested in", "interested_in"),
        (r"(?i)how (much|many)", "how_much"),
        (r"(?i)email", "email"),
        (r"(?i)phone", "phone"),
        (r"(?i)call", "call"),
        (r"(?i)contact", "contact"),
        (r"(?i)early access", "early_access"),
        (r"(?i)waitlist", "waitlist"),
        (r"(?i)sign up", "sign_up"),
    ]
    .into_iter()
    .map(|(pattern, label)| (Regex::new(pattern).expect("lead pattern must compile"), label))
    .collect()
});

/// Pure, stateless purchase-intent detector
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadClassifier;

impl LeadClassifier {
    pub fn new() -> Self {
        Self
    }

    /// `true` if any lead pattern matches `text`
    pub fn classify(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }

    /// Label of the first matching pattern, for logging
    pub fn first_match(&self, text: &str) -> Option<&'static str> {
        if text.is_empty() {
            return None;
        }

        LEAD_PATTERNS
            .iter()
            .find(|(regex, _)| regex.is_match(text))
            .map(|(_, label)| *label)
    }
}
