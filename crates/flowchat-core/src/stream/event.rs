//! Decoded stream event types

use serde::{Deserialize, Serialize};

/// Metadata carried by a `complete` event.
///
/// The workflow-binding fields are optional and forward-compatible; the
/// engine records a binding only when `workflow_bound_id` is explicitly
/// present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompletionMeta {
    /// Server-side conversation id for this exchange
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// Number of prompts consumed so far in this conversation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_count: Option<u32>,
    /// Tools the assistant invoked while producing the response
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mcp_tools_used: Vec<String>,
    /// Workflow artifact this conversation became bound to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_bound_id: Option<String>,
    /// Whether further free-form chat is locked for this conversation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_chat_locked: Option<bool>,
}

/// One decoded unit of the streaming protocol.
///
/// Wire format: each `data: <json>` line carries one event tagged by `type`.
/// Unrecognized types decode as [`StreamEvent::Unknown`] so new server-side
/// event kinds never break the sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// The server accepted the request and will stream a response
    Start,
    /// One increment of assistant response text
    Chunk {
        #[serde(default)]
        content: Option<String>,
    },
    /// The response is complete; metadata may carry workflow-binding state
    Complete {
        #[serde(flatten)]
        meta: CompletionMeta,
    },
    /// The server aborted the response
    Error {
        #[serde(default)]
        error: Option<String>,
    },
    /// Forward-compatibility catch-all
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_start() {
        let event: StreamEvent = serde_json::from_str(r#"{"type": "start"}"#).unwrap();
        assert_eq!(event, StreamEvent::Start);
    }

    #[test]
    fn test_decode_chunk() {
        let event: StreamEvent =
            serde_json::from_str(r#"{"type": "chunk", "content": "Hello"}"#).unwrap();
        assert_eq!(
            event,
            StreamEvent::Chunk {
                content: Some("Hello".to_string())
            }
        );
    }

    #[test]
    fn test_decode_complete_with_binding() {
        let event: StreamEvent = serde_json::from_str(
            r#"{"type": "complete", "workflow_bound_id": "wf-9", "is_chat_locked": true, "prompt_count": 3}"#,
        )
        .unwrap();
        match event {
            StreamEvent::Complete { meta } => {
                assert_eq!(meta.workflow_bound_id.as_deref(), Some("wf-9"));
                assert_eq!(meta.is_chat_locked, Some(true));
                assert_eq!(meta.prompt_count, Some(3));
            }
            other => panic!("expected complete, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_bare_complete() {
        let event: StreamEvent = serde_json::from_str(r#"{"type": "complete"}"#).unwrap();
        assert_eq!(
            event,
            StreamEvent::Complete {
                meta: CompletionMeta::default()
            }
        );
    }

    #[test]
    fn test_unknown_type_is_tolerated() {
        let event: StreamEvent =
            serde_json::from_str(r#"{"type": "heartbeat", "elapsed": 10}"#).unwrap();
        assert_eq!(event, StreamEvent::Unknown);
    }
}
