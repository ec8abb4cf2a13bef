//! Wire types for the assistant backend API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Language;

/// Body of a chat exchange, identical for both modes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    /// The user's message text, already trimmed
    pub message: String,
    /// Session grouping this conversation server-side
    pub session_id: String,
    /// Target conversation
    pub conversation_id: String,
    /// Language the assistant should answer in
    pub language: Language,
}

/// Response of a non-streaming chat exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The assistant's full response text
    pub response: String,
    /// Server-side conversation id
    pub conversation_id: String,
    /// Number of prompts consumed so far in this conversation
    pub prompt_count: u32,
    /// Tools the assistant invoked while producing the response
    #[serde(default)]
    pub mcp_tools_used: Vec<String>,
    /// Workflow artifact this conversation became bound to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_bound_id: Option<String>,
    /// Whether further free-form chat is locked for this conversation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_chat_locked: Option<bool>,
}

/// Response of a session creation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub user_identifier: String,
    pub created_at: DateTime<Utc>,
}

/// Per-conversation binding entry inside a session record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationBinding {
    pub conversation_id: String,
    #[serde(default)]
    pub workflow_bound_id: Option<String>,
    #[serde(default)]
    pub is_chat_locked: bool,
}

/// Full session record, including all known conversations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: String,
    pub user_identifier: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub conversations: Vec<ConversationBinding>,
}

/// Result of the backend health probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub mcp_server_connected: Option<bool>,
}

// ============================================================================
// Workflow specification (consumed by the diagram collaborator)
// ============================================================================

/// Kind of a workflow state node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStateKind {
    Initial,
    Intermediate,
    Final,
}

/// One state in a workflow specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub slug: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WorkflowStateKind,
}

/// A form field attached to a workflow action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub label: String,
    pub required: bool,
}

/// Form required by an action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowForm {
    pub fields: Vec<FormField>,
}

/// One transition in a workflow specification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowAction {
    pub slug: String,
    pub from: String,
    pub to: String,
    pub requires_form: bool,
    pub permission: String,
    #[serde(default)]
    pub form: Option<WorkflowForm>,
}

/// A permission referenced by workflow actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowPermission {
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// An automation attached to a workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowAutomation {
    pub id: String,
    pub trigger: String,
    pub action: String,
}

/// A complete workflow specification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSpec {
    pub spec_id: String,
    pub spec_version: u32,
    pub tenant_id: String,
    pub name: String,
    pub slug: String,
    pub states: Vec<WorkflowState>,
    pub actions: Vec<WorkflowAction>,
    pub permissions: Vec<WorkflowPermission>,
    pub automations: Vec<WorkflowAutomation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Language;

    #[test]
    fn test_chat_request_wire_shape() {
        let request = ChatRequest {
            message: "hello".to_string(),
            session_id: "s-1".to_string(),
            conversation_id: "conv-1".to_string(),
            language: Language::English,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["language"], "en");
        assert_eq!(json["session_id"], "s-1");
    }

    #[test]
    fn test_chat_response_optional_binding() {
        let json = r#"{
            "response": "done",
            "conversation_id": "conv-1",
            "prompt_count": 2,
            "mcp_tools_used": ["create_workflow"]
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(response.workflow_bound_id.is_none());
        assert_eq!(response.mcp_tools_used.len(), 1);
    }

    #[test]
    fn test_health_status_decode() {
        let health: HealthStatus =
            serde_json::from_str(r#"{"status": "healthy", "mcp_server_connected": true}"#).unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.mcp_server_connected, Some(true));

        // The MCP flag is optional on older backends.
        let bare: HealthStatus = serde_json::from_str(r#"{"status": "degraded"}"#).unwrap();
        assert_eq!(bare.mcp_server_connected, None);
    }

    #[test]
    fn test_workflow_spec_camel_case() {
        let json = r#"{
            "specId": "wf-1",
            "specVersion": 2,
            "tenantId": "t-1",
            "name": "Approvals",
            "slug": "approvals",
            "states": [{"slug": "open", "name": "Open", "type": "initial"}],
            "actions": [{"slug": "approve", "from": "open", "to": "done",
                         "requiresForm": false, "permission": "any"}],
            "permissions": [],
            "automations": []
        }"#;
        let spec: WorkflowSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.spec_id, "wf-1");
        assert_eq!(spec.states[0].kind, WorkflowStateKind::Initial);
        assert!(!spec.actions[0].requires_form);
    }
}
