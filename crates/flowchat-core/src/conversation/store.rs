//! In-memory conversation mapping with copy-on-write updates
//!
//! The single shared mutable resource of the engine. Every mutation clones
//! the target conversation, applies the change, and swaps the whole record
//! back in; message sequences are never aliased across revisions, so a
//! reader holding a previous revision observes nothing torn.

use std::collections::HashMap;

use chrono::Utc;

use super::types::{Conversation, Message, MessageRole, MessageStatus};
use crate::config::TITLE_MAX_LENGTH;

/// Mapping from conversation id to conversation record
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: HashMap<String, Conversation>,
}

impl ConversationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a conversation, replacing any record under the same id
    pub fn insert(&mut self, conversation: Conversation) {
        self.conversations
            .insert(conversation.id.clone(), conversation);
    }

    /// Create and insert a fresh conversation, returning its id
    pub fn create(&mut self, title: impl Into<String>) -> String {
        let conversation = Conversation::new(title);
        let id = conversation.id.clone();
        self.insert(conversation);
        id
    }

    /// Look up a conversation by id
    pub fn get(&self, conversation_id: &str) -> Option<&Conversation> {
        self.conversations.get(conversation_id)
    }

    /// Whether a conversation exists
    pub fn contains(&self, conversation_id: &str) -> bool {
        self.conversations.contains_key(conversation_id)
    }

    /// All conversations, most recently updated first
    pub fn all(&self) -> Vec<Conversation> {
        let mut all: Vec<Conversation> = self.conversations.values().cloned().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        all
    }

    /// Number of conversations held
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    /// Whether the store holds no conversations
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Remove a conversation
    pub fn remove(&mut self, conversation_id: &str) -> Option<Conversation> {
        self.conversations.remove(conversation_id)
    }

    /// Append a message to a conversation.
    ///
    /// Returns false (and changes nothing) for an unknown conversation id.
    pub fn append_message(&mut self, conversation_id: &str, message: Message) -> bool {
        self.update(conversation_id, |conversation| {
            conversation.messages.push(message);
        })
    }

    /// Append a user message, applying the one-time title rule.
    ///
    /// The title is set from the first user message of the conversation,
    /// truncated to fifty characters with an ellipsis, and never changed
    /// again.
    pub fn append_user_message(&mut self, conversation_id: &str, message: Message) -> bool {
        debug_assert_eq!(message.role, MessageRole::User);
        self.update(conversation_id, |conversation| {
            if !conversation.has_user_message() {
                conversation.title = truncate_title(&message.content);
            }
            conversation.messages.push(message);
        })
    }

    /// Append streamed text to a message's content, in decode order.
    ///
    /// Applies only while the message is still `sending`; one call per
    /// decoded chunk, no coalescing, so observers see monotonically growing
    /// content.
    pub fn append_chunk(&mut self, conversation_id: &str, message_id: &str, text: &str) -> bool {
        self.update_message(conversation_id, message_id, |message| {
            if message.status == MessageStatus::Sending {
                message.content.push_str(text);
            }
        })
    }

    /// Mark a streaming message as delivered.
    ///
    /// Idempotent: completing an already-`sent` message is a no-op
    /// overwrite, and a message in `error` is never resurrected.
    pub fn complete_message(&mut self, conversation_id: &str, message_id: &str) -> bool {
        self.update_message(conversation_id, message_id, |message| {
            if message.status == MessageStatus::Sending {
                message.status = MessageStatus::Sent;
            }
        })
    }

    /// Mark a message as failed. A message in `error` stays in `error`.
    pub fn fail_message(&mut self, conversation_id: &str, message_id: &str) -> bool {
        self.update_message(conversation_id, message_id, |message| {
            message.status = MessageStatus::Error;
        })
    }

    /// Clone-mutate-swap one conversation record, refreshing `updated_at`
    fn update<F>(&mut self, conversation_id: &str, apply: F) -> bool
    where
        F: FnOnce(&mut Conversation),
    {
        let Some(existing) = self.conversations.get(conversation_id) else {
            return false;
        };
        let mut next = existing.clone();
        apply(&mut next);
        next.updated_at = Utc::now();
        self.conversations.insert(conversation_id.to_string(), next);
        true
    }

    fn update_message<F>(&mut self, conversation_id: &str, message_id: &str, apply: F) -> bool
    where
        F: FnOnce(&mut Message),
    {
        let mut found = false;
        let applied = self.update(conversation_id, |conversation| {
            if let Some(message) = conversation.messages.iter_mut().find(|m| m.id == message_id) {
                apply(message);
                found = true;
            }
        });
        applied && found
    }
}

/// Truncate a title to the display limit, appending an ellipsis if cut
fn truncate_title(content: &str) -> String {
    let mut title: String = content.chars().take(TITLE_MAX_LENGTH).collect();
    if content.chars().count() > TITLE_MAX_LENGTH {
        title.push_str("...");
    }
    title
}
