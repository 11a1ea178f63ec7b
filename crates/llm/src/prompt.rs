//! Prompt Building
//!
//! Flattens the persona instruction, recent history and the new message into
//! the single text prompt sent to the generative model.

use std::fmt::Write;

use nira_core::InboundMessage;

/// Persona instruction used unless `generative.system_prompt` overrides it
pub const NIRA_SYSTEM_PROMPT: &str = r#"You are Nira's AI Assistant. You are a powerful, reliable co-pilot on the clinician's side.

Key Directives:
- Primary Goal: Guide users to understand Nira's value and encourage them to "Request Early Access" or "Join the Waitlist"
- Handle Objections: For cost questions, explain our freemium model with affordable subscription tiers
- Security First: Emphasize security-first design, de-identified data handling, and HIPAA compliance roadmap
- Stay Focused: Stick to core knowledge, don't make up features

Always be helpful, conversational, and focused on the user's needs while guiding them toward early access."#;

/// Builds transcript-style prompts
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    system_prompt: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(NIRA_SYSTEM_PROMPT)
    }
}

impl PromptBuilder {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    /// Use the configured override, or the built-in persona when unset or blank
    pub fn from_override(system_prompt: Option<String>) -> Self {
        match system_prompt {
            Some(prompt) if !prompt.trim().is_empty() => Self::new(prompt),
            _ => Self::default(),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Build the prompt for one message
    ///
    /// Only [`InboundMessage::recent_history`] is included.
    pub fn build(&self, message: &InboundMessage) -> String {
        let mut prompt = String::with_capacity(self.system_prompt.len() + 256);
        prompt.push_str(&self.system_prompt);
        prompt.push_str("\n\nConversation History:\n");

        for entry in message.recent_history() {
            // Writing into a String cannot fail
            let _ = writeln!(prompt, "{}: {}", entry.sender.transcript_label(), entry.text);
        }

        let _ = write!(prompt, "\nUser: {}\nAssistant:", message.text);
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nira_core::HistoryEntry;

    #[test]
    fn test_prompt_without_history() {
        let builder = PromptBuilder::new("SYS");
        let prompt = builder.build(&InboundMessage::new("Hello"));
        assert_eq!(prompt, "SYS\n\nConversation History:\n\nUser: Hello\nAssistant:");
    }

    #[test]
    fn test_prompt_labels_history() {
        let builder = PromptBuilder::new("SYS");
        let message = InboundMessage::new("And pricing?").with_history(vec![
            HistoryEntry::user("What is Nira?"),
            HistoryEntry::bot("A healthcare AI platform."),
        ]);

        let prompt = builder.build(&message);
        assert_eq!(
            prompt,
            "SYS\n\nConversation History:\nUser: What is Nira?\nAssistant: A healthcare AI platform.\n\nUser: And pricing?\nAssistant:"
        );
    }

    #[test]
    fn test_prompt_truncates_history() {
        let history: Vec<HistoryEntry> =
            (1..=7).map(|i| HistoryEntry::user(format!("turn-{}", i))).collect();
        let message = InboundMessage::new("latest").with_history(history);

        let prompt = PromptBuilder::default().build(&message);
        assert!(!prompt.contains("turn-1\n"));
        assert!(!prompt.contains("turn-2\n"));
        for i in 3..=7 {
            assert!(prompt.contains(&format!("User: turn-{}\n", i)));
        }
        assert!(prompt.starts_with(NIRA_SYSTEM_PROMPT));
    }

    #[test]
    fn test_blank_override_uses_persona() {
        assert_eq!(
            PromptBuilder::from_override(Some("  ".to_string())).system_prompt(),
            NIRA_SYSTEM_PROMPT
        );
        assert_eq!(
            PromptBuilder::from_override(Some("Custom".to_string())).system_prompt(),
            "Custom"
        );
        assert_eq!(PromptBuilder::from_override(None).system_prompt(), NIRA_SYSTEM_PROMPT);
    }
}
