//! Identifier generation utilities
//!
//! Produces collision-resistant opaque identifiers for conversations and
//! messages, and a semi-unique user identifier derived from a client
//! fingerprint.

use chrono::Utc;
use uuid::Uuid;

/// Prefix for conversation identifiers
pub const CONVERSATION_ID_PREFIX: &str = "conv-";

/// Prefix for message identifiers
pub const MESSAGE_ID_PREFIX: &str = "msg-";

/// Generate a unique conversation ID
pub fn conversation_id() -> String {
    format!("{}{}", CONVERSATION_ID_PREFIX, Uuid::new_v4())
}

/// Generate a unique message ID
pub fn message_id() -> String {
    format!("{}{}", MESSAGE_ID_PREFIX, Uuid::new_v4())
}

/// Check if an ID is a conversation ID
pub fn is_conversation_id(id: &str) -> bool {
    id.starts_with(CONVERSATION_ID_PREFIX)
}

/// Check if an ID is a message ID
pub fn is_message_id(id: &str) -> bool {
    id.starts_with(MESSAGE_ID_PREFIX)
}

/// Client attributes combined into a semi-unique user identifier.
///
/// The resulting identifier groups conversations server-side without any
/// account system: a fingerprint built from environment details plus the
/// creation instant is reduced to a short token.
#[derive(Debug, Clone)]
pub struct ClientFingerprint {
    /// User-agent string of the embedding client
    pub user_agent: String,
    /// Screen resolution as (width, height)
    pub screen: (u32, u32),
    /// IANA timezone name
    pub timezone: String,
}

impl ClientFingerprint {
    /// Create a fingerprint from the raw attributes
    pub fn new(user_agent: impl Into<String>, screen: (u32, u32), timezone: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            screen,
            timezone: timezone.into(),
        }
    }

    /// Derive the user identifier: `user_<hash>_<millis>`.
    ///
    /// The hash is intentionally non-cryptographic; uniqueness comes from the
    /// timestamp component, the hash only folds the environment details in.
    pub fn user_identifier(&self) -> String {
        let millis = Utc::now().timestamp_millis();
        let raw = format!(
            "{}-{}x{}-{}-{}",
            self.user_agent, self.screen.0, self.screen.1, self.timezone, millis
        );
        format!("user_{}_{}", fold_hash(&raw).unsigned_abs(), millis)
    }
}

/// 32-bit string fold: `hash = hash * 31 + ch`, wrapping.
fn fold_hash(input: &str) -> i32 {
    let mut hash: i32 = 0;
    for ch in input.chars() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(ch as i32);
    }
    hash
}
