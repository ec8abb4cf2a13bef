//! Conversation and message model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// Delivery status of a message.
///
/// Transitions only move forward: `sending → sent` or `sending → error`
/// (plus `sent → error` for an optimistically appended user message whose
/// request later fails). A message is never resurrected from `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Sending,
    Sent,
    Error,
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageStatus::Sending => write!(f, "sending"),
            MessageStatus::Sent => write!(f, "sent"),
            MessageStatus::Error => write!(f, "error"),
        }
    }
}

/// One message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Opaque message id
    pub id: String,
    /// Message text; for a streaming assistant message this grows in place
    /// as chunks arrive
    pub content: String,
    /// Author role
    pub role: MessageRole,
    /// Creation instant
    pub timestamp: DateTime<Utc>,
    /// Delivery status
    pub status: MessageStatus,
}

impl Message {
    /// Create a user message, already considered delivered
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: ids::message_id(),
            content: content.into(),
            role: MessageRole::User,
            timestamp: Utc::now(),
            status: MessageStatus::Sent,
        }
    }

    /// Create a completed assistant message from a full response
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: ids::message_id(),
            content: content.into(),
            role: MessageRole::Assistant,
            timestamp: Utc::now(),
            status: MessageStatus::Sent,
        }
    }

    /// Create an empty assistant placeholder for a streaming run
    pub fn streaming_placeholder() -> Self {
        Self {
            id: ids::message_id(),
            content: String::new(),
            role: MessageRole::Assistant,
            timestamp: Utc::now(),
            status: MessageStatus::Sending,
        }
    }
}

/// One ordered thread of messages with a title
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Opaque conversation id
    pub id: String,
    /// Title, set once from the first user message
    pub title: String,
    /// Messages in append order
    pub messages: Vec<Message>,
    /// Creation instant
    pub created_at: DateTime<Utc>,
    /// Refreshed on every message append or content update
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create an empty conversation with a provisional title
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ids::conversation_id(),
            title: title.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether any user message has been appended yet
    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(|m| m.role == MessageRole::User)
    }

    /// Look up a message by id
    pub fn message(&self, message_id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == message_id)
    }
}

/// Per-conversation workflow binding state.
///
/// Discovered lazily from response and stream metadata, so the UI-facing
/// lock state is eventually consistent with the server's view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionBinding {
    /// Workflow artifact the conversation is bound to
    pub workflow_bound_id: Option<String>,
    /// Whether further free-form chat is locked
    pub is_chat_locked: bool,
}

impl SessionBinding {
    /// Whether a workflow binding has been recorded
    pub fn is_bound(&self) -> bool {
        self.workflow_bound_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_starts_sent() {
        let message = Message::user("hello");
        assert_eq!(message.role, MessageRole::User);
        assert_eq!(message.status, MessageStatus::Sent);
        assert!(crate::ids::is_message_id(&message.id));
    }

    #[test]
    fn test_placeholder_starts_sending_and_empty() {
        let message = Message::streaming_placeholder();
        assert_eq!(message.role, MessageRole::Assistant);
        assert_eq!(message.status, MessageStatus::Sending);
        assert!(message.content.is_empty());
    }

    #[test]
    fn test_conversation_message_lookup() {
        let mut conversation = Conversation::new("New chat");
        let message = Message::user("hi");
        let id = message.id.clone();
        conversation.messages.push(message);

        assert!(conversation.message(&id).is_some());
        assert!(conversation.message("msg-unknown").is_none());
        assert!(conversation.has_user_message());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(format!("{}", MessageStatus::Sending), "sending");
        assert_eq!(format!("{}", MessageStatus::Sent), "sent");
        assert_eq!(format!("{}", MessageStatus::Error), "error");
    }
}
