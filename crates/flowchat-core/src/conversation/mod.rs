//! Conversation state model and store

mod store;
mod types;

pub use store::ConversationStore;
pub use types::{Conversation, Message, MessageRole, MessageStatus, SessionBinding};
