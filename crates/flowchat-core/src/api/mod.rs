//! HTTP transport and backend API services

mod chat;
mod client;
mod session;
mod types;
mod workflow;

pub use chat::{ChatApi, ChatBackend};
pub use client::HttpClient;
pub use session::{SessionApi, SessionBackend};
pub use types::{
    ChatRequest, ChatResponse, ConversationBinding, FormField, HealthStatus, SessionData,
    SessionResponse, WorkflowAction, WorkflowAutomation, WorkflowForm, WorkflowPermission,
    WorkflowSpec, WorkflowState, WorkflowStateKind,
};
pub use workflow::WorkflowApi;

#[cfg(test)]
pub(crate) use session::MockSessionBackend;
