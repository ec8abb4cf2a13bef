//! Error types, classification, and user-facing messages

mod classifiers;
mod types;
mod user_messages;

pub use classifiers::ErrorKind;
pub(crate) use classifiers::classify_http_failure;
pub use types::{ChatError, ChatResult};
pub use user_messages::ErrorMessages;
