//! Conversation types for the chat responder
//!
//! Every value here lives for a single request. Nothing is persisted.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Number of prior turns included when prompting the remote model
pub const HISTORY_WINDOW: usize = 5;

/// Who authored a history entry
///
/// Anything the client sends that is not `user` is treated as the bot side,
/// including a missing sender.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    #[default]
    #[serde(other)]
    Bot,
}

impl Sender {
    /// Speaker label used in the prompt transcript
    pub fn transcript_label(&self) -> &'static str {
        match self {
            Sender::User => "User",
            Sender::Bot => "Assistant",
        }
    }
}

/// A prior message in the chat widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub sender: Sender,
    #[serde(default)]
    pub text: String,
}

impl HistoryEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

/// Opaque key-value bag sent by the widget; never validated
pub type UserContext = serde_json::Map<String, serde_json::Value>;

/// One inbound chat request
#[derive(Debug, Clone, Default)]
pub struct InboundMessage {
    pub text: String,
    pub history: Vec<HistoryEntry>,
    pub user_context: UserContext,
}

impl InboundMessage {
    /// Create a message with no history
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Attach prior turns
    pub fn with_history(mut self, history: Vec<HistoryEntry>) -> Self {
        self.history = history;
        self
    }

    /// Attach the client's context bag
    pub fn with_user_context(mut self, user_context: UserContext) -> Self {
        self.user_context = user_context;
        self
    }

    /// The last [`HISTORY_WINDOW`] entries, oldest first
    pub fn recent_history(&self) -> &[HistoryEntry] {
        let start = self.history.len().saturating_sub(HISTORY_WINDOW);
        &self.history[start..]
    }
}

/// Reply returned to the chat widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyResult {
    pub reply: String,
    pub is_potential_lead: bool,
    /// Milliseconds since the Unix epoch, as a string
    pub timestamp: String,
}

impl ReplyResult {
    /// Build a reply stamped with the current time
    pub fn now(reply: impl Into<String>, is_potential_lead: bool) -> Self {
        Self {
            reply: reply.into(),
            is_potential_lead,
            timestamp: epoch_millis(),
        }
    }
}

/// Current time as stringified milliseconds since the epoch
pub fn epoch_millis() -> String {
    Utc::now().timestamp_millis().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_history_keeps_last_five() {
        let history: Vec<HistoryEntry> = (0..8).map(|i| HistoryEntry::user(format!("m{}", i))).collect();
        let msg = InboundMessage::new("hi").with_history(history);

        let recent = msg.recent_history();
        assert_eq!(recent.len(), HISTORY_WINDOW);
        assert_eq!(recent[0].text, "m3");
        assert_eq!(recent[4].text, "m7");
    }

    #[test]
    fn test_recent_history_short() {
        let msg = InboundMessage::new("hi").with_history(vec![HistoryEntry::bot("hello")]);
        assert_eq!(msg.recent_history().len(), 1);
        assert!(InboundMessage::new("hi").recent_history().is_empty());
    }

    #[test]
    fn test_unknown_sender_is_bot() {
        let entry: HistoryEntry =
            serde_json::from_str(r#"{"sender":"assistant","text":"x"}"#).unwrap();
        assert_eq!(entry.sender, Sender::Bot);

        let entry: HistoryEntry = serde_json::from_str(r#"{"sender":"user","text":"y"}"#).unwrap();
        assert_eq!(entry.sender, Sender::User);
    }

    #[test]
    fn test_missing_sender_is_bot() {
        let entry: HistoryEntry = serde_json::from_str(r#"{"text":"x"}"#).unwrap();
        assert_eq!(entry, HistoryEntry::bot("x"));
    }

    #[test]
    fn test_reply_serializes_camel_case() {
        let reply = ReplyResult::now("hello", true);
        let json = serde_json::to_value(&reply).unwrap();

        assert_eq!(json["reply"], "hello");
        assert_eq!(json["isPotentialLead"], true);
        let ts = json["timestamp"].as_str().unwrap();
        assert!(ts.parse::<i64>().unwrap() > 0);
    }
}
