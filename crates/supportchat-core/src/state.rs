//! UI-agnostic conversation state
//!
//! This module contains the data structures shared between frontends (the
//! terminal widget, the one-shot CLI) that don't depend on any UI framework.

use serde::{Deserialize, Serialize};

/// Number of characters of a message repeated in an announcement.
const ANNOUNCEMENT_CHARS: usize = 100;

/// A single entry in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Who sent a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Agent,
}

/// Append-only record of the current session's messages.
///
/// Entries can only be added through the controller and are never mutated or
/// removed, so insertion order is chronological order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ConversationLog {
    entries: Vec<ChatMessage>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.entries.last()
    }

    pub(crate) fn push(&mut self, role: ChatRole, content: impl Into<String>) -> &ChatMessage {
        self.entries.push(ChatMessage {
            role,
            content: content.into(),
        });
        &self.entries[self.entries.len() - 1]
    }
}

/// Whether a chat request is currently in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
}

impl RequestState {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending)
    }
}

/// Short spoken-style summary of a new message ("You said: ...").
pub fn announcement(role: ChatRole, content: &str) -> String {
    let speaker = match role {
        ChatRole::User => "You said",
        ChatRole::Agent => "Agent said",
    };
    let excerpt: String = content.chars().take(ANNOUNCEMENT_CHARS).collect();
    format!("{}: {}", speaker, excerpt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let msg = ChatMessage {
            role: ChatRole::Agent,
            content: "hi".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"agent","content":"hi"}"#);
    }

    #[test]
    fn test_log_serializes_as_array() {
        let mut log = ConversationLog::new();
        log.push(ChatRole::User, "hello");
        log.push(ChatRole::Agent, "hi there");
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"role": "user", "content": "hello"},
                {"role": "agent", "content": "hi there"},
            ])
        );
    }

    #[test]
    fn test_log_preserves_order() {
        let mut log = ConversationLog::new();
        assert!(log.is_empty());
        log.push(ChatRole::User, "one");
        log.push(ChatRole::Agent, "two");
        log.push(ChatRole::User, "three");
        let contents: Vec<&str> = log.entries().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
        assert_eq!(log.last().unwrap().role, ChatRole::User);
    }

    #[test]
    fn test_announcement_truncates() {
        let long = "x".repeat(250);
        let text = announcement(ChatRole::Agent, &long);
        assert_eq!(text, format!("Agent said: {}", "x".repeat(100)));
        assert_eq!(announcement(ChatRole::User, "hey"), "You said: hey");
    }
}
