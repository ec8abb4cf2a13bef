//! FlowChat Core Library
//!
//! Client-side engine for a streaming AI workflow assistant: the streaming
//! protocol decoder, the conversation-state reconciler, and the session
//! lifecycle manager, plus the HTTP transport they sit on.

pub mod api;
pub mod config;
pub mod conversation;
pub mod engine;
pub mod error;
pub mod ids;
pub mod session;
pub mod stream;

// Re-export commonly used types
pub use api::{ChatApi, ChatBackend, ChatRequest, ChatResponse, HttpClient, SessionApi, WorkflowApi};
pub use config::{ApiConfig, Language};
pub use conversation::{Conversation, ConversationStore, Message, MessageRole, MessageStatus};
pub use engine::{ChatEngine, StreamCoordinator};
pub use error::{ChatError, ChatResult, ErrorKind, ErrorMessages};
pub use ids::ClientFingerprint;
pub use session::{FileSessionStore, SessionManager, SessionPhase, SessionStartup};
pub use stream::{CompletionMeta, SseFrameDecoder, StreamEvent};
