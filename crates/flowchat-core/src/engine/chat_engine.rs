//! Conversation-state reconciler
//!
//! Applies optimistic updates for outbound messages, reconciles streamed and
//! non-streamed responses back into the conversation store, and surfaces
//! classified failures as localized message strings. All methods take
//! `&self`; internal state lives behind short-lived locks that are never
//! held across an await point, so a cancel request can land while an
//! exchange is in flight.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::StreamExt;
use parking_lot::Mutex;

use super::coordinator::{RunHandle, RunState, StreamCoordinator};
use crate::api::{ChatBackend, ChatRequest, ChatResponse, SessionData, WorkflowApi, WorkflowSpec};
use crate::config::Language;
use crate::conversation::{Conversation, ConversationStore, Message, SessionBinding};
use crate::error::{ChatError, ChatResult, ErrorMessages};
use crate::session::{SessionManager, SessionStartup};
use crate::stream::{CompletionMeta, StreamEvent};

/// Client-side chat engine: one conversation store, one session, at most one
/// streaming exchange in flight.
pub struct ChatEngine {
    backend: Box<dyn ChatBackend>,
    workflows: Option<WorkflowApi>,
    session: Arc<SessionManager>,
    language: Language,
    messages: ErrorMessages,
    store: Mutex<ConversationStore>,
    bindings: Mutex<HashMap<String, SessionBinding>>,
    error: Mutex<Option<String>>,
    streaming_error: Mutex<Option<String>>,
    is_loading: AtomicBool,
    coordinator: StreamCoordinator,
}

impl ChatEngine {
    /// Create an engine over a chat backend and a session manager.
    ///
    /// The language selects both the wire-level answer language and the
    /// localized error message bundle.
    pub fn new(
        backend: Box<dyn ChatBackend>,
        session: Arc<SessionManager>,
        language: Language,
    ) -> Self {
        let messages = match language {
            Language::English => ErrorMessages::english(),
            Language::Spanish => ErrorMessages::spanish(),
        };
        Self {
            backend,
            workflows: None,
            session,
            language,
            messages,
            store: Mutex::new(ConversationStore::new()),
            bindings: Mutex::new(HashMap::new()),
            error: Mutex::new(None),
            streaming_error: Mutex::new(None),
            is_loading: AtomicBool::new(false),
            coordinator: StreamCoordinator::new(),
        }
    }

    /// Attach a workflow API for binding lookups
    pub fn with_workflow_api(mut self, workflows: WorkflowApi) -> Self {
        self.workflows = Some(workflows);
        self
    }

    /// The session manager backing this engine
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    // ------------------------------------------------------------------
    // Conversation access
    // ------------------------------------------------------------------

    /// Create a fresh conversation and return its id
    pub fn create_conversation(&self, title: impl Into<String>) -> String {
        self.store.lock().create(title)
    }

    /// Insert an existing conversation record
    pub fn insert_conversation(&self, conversation: Conversation) {
        self.store.lock().insert(conversation);
    }

    /// Snapshot of one conversation
    pub fn conversation(&self, conversation_id: &str) -> Option<Conversation> {
        self.store.lock().get(conversation_id).cloned()
    }

    /// Snapshot of all conversations, most recently updated first
    pub fn conversations(&self) -> Vec<Conversation> {
        self.store.lock().all()
    }

    /// Remove a conversation and its binding state
    pub fn remove_conversation(&self, conversation_id: &str) -> Option<Conversation> {
        self.bindings.lock().remove(conversation_id);
        self.store.lock().remove(conversation_id)
    }

    /// Workflow binding state for a conversation; unbound by default
    pub fn binding(&self, conversation_id: &str) -> SessionBinding {
        self.bindings
            .lock()
            .get(conversation_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Seed binding state from a restored session record
    pub fn seed_from_startup(&self, startup: &SessionStartup) {
        if let SessionStartup::Restored(data) = startup {
            self.seed_bindings(data);
        }
    }

    fn seed_bindings(&self, data: &SessionData) {
        let mut bindings = self.bindings.lock();
        for entry in &data.conversations {
            if entry.workflow_bound_id.is_some() || entry.is_chat_locked {
                bindings.insert(
                    entry.conversation_id.clone(),
                    SessionBinding {
                        workflow_bound_id: entry.workflow_bound_id.clone(),
                        is_chat_locked: entry.is_chat_locked,
                    },
                );
            }
        }
    }

    // ------------------------------------------------------------------
    // Status flags and error slots
    // ------------------------------------------------------------------

    /// Whether a non-streaming exchange is in flight
    pub fn is_loading(&self) -> bool {
        self.is_loading.load(Ordering::SeqCst)
    }

    /// Whether a streaming exchange is externally visible as in flight
    pub fn is_streaming(&self) -> bool {
        self.coordinator.is_streaming()
    }

    /// The localized message from the last failed non-streaming exchange
    pub fn error(&self) -> Option<String> {
        self.error.lock().clone()
    }

    /// The localized message from the last failed streaming exchange
    pub fn streaming_error(&self) -> Option<String> {
        self.streaming_error.lock().clone()
    }

    /// Clear the non-streaming error slot
    pub fn clear_error(&self) {
        *self.error.lock() = None;
    }

    /// Clear the streaming error slot
    pub fn clear_streaming_error(&self) {
        *self.streaming_error.lock() = None;
    }

    // ------------------------------------------------------------------
    // Non-streaming exchange
    // ------------------------------------------------------------------

    /// Send a message and reconcile the full response.
    ///
    /// The user message is appended optimistically before the request goes
    /// out. On failure it is marked `error`, the error slot receives a
    /// localized message, and `None` is returned; the caller reads the slot
    /// rather than an error value.
    pub async fn send_message(
        &self,
        conversation_id: &str,
        message: &str,
    ) -> Option<ChatResponse> {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return None;
        }
        let Some(request) = self.build_request(conversation_id, trimmed) else {
            return None;
        };

        let user = Message::user(trimmed);
        let user_id = user.id.clone();
        self.store.lock().append_user_message(conversation_id, user);
        self.is_loading.store(true, Ordering::SeqCst);

        let outcome = self.backend.send_message(&request).await;
        self.is_loading.store(false, Ordering::SeqCst);

        match outcome {
            Ok(response) => {
                self.store
                    .lock()
                    .append_message(conversation_id, Message::assistant(&response.response));
                self.record_binding(
                    conversation_id,
                    response.workflow_bound_id.as_deref(),
                    response.is_chat_locked,
                );
                Some(response)
            }
            Err(error) => {
                tracing::error!(kind = %error.kind(), "chat exchange failed");
                self.store.lock().fail_message(conversation_id, &user_id);
                *self.error.lock() = Some(self.messages.message_for(&error));
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Streaming exchange
    // ------------------------------------------------------------------

    /// Send a message and reconcile the response incrementally.
    ///
    /// Appends the user message and an empty assistant placeholder, then
    /// applies decoded events to the placeholder until the stream completes,
    /// fails, or is cancelled. Starting a new run cancels the previous one.
    /// Cancellation is not a failure: the placeholder keeps whatever content
    /// it has accumulated and no error message is surfaced.
    pub async fn send_streaming(
        &self,
        conversation_id: &str,
        message: &str,
    ) -> Option<CompletionMeta> {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return None;
        }
        let Some(request) = self.build_request(conversation_id, trimmed) else {
            return None;
        };

        let run = self.coordinator.begin();

        let placeholder = Message::streaming_placeholder();
        let placeholder_id = placeholder.id.clone();
        {
            let mut store = self.store.lock();
            store.append_user_message(conversation_id, Message::user(trimmed));
            store.append_message(conversation_id, placeholder);
        }

        let mut events = match self
            .backend
            .stream_message(&request, run.token().clone())
            .await
        {
            Ok(events) => events,
            Err(error) => {
                return self.fail_streaming(&run, conversation_id, &placeholder_id, error);
            }
        };

        let mut has_started = false;
        let mut completion: Option<CompletionMeta> = None;

        while !run.token().is_cancelled() {
            let Some(event) = events.next().await else {
                break;
            };
            match event {
                Ok(StreamEvent::Start) => has_started = true,
                Ok(StreamEvent::Chunk { content }) => {
                    if let Some(text) = content {
                        self.store
                            .lock()
                            .append_chunk(conversation_id, &placeholder_id, &text);
                    }
                }
                Ok(StreamEvent::Complete { meta }) => {
                    self.store
                        .lock()
                        .complete_message(conversation_id, &placeholder_id);
                    self.record_binding(
                        conversation_id,
                        meta.workflow_bound_id.as_deref(),
                        meta.is_chat_locked,
                    );
                    completion = Some(meta);
                    break;
                }
                Ok(StreamEvent::Error { error }) => {
                    let message =
                        error.unwrap_or_else(|| "streaming error occurred".to_string());
                    return self.fail_streaming(
                        &run,
                        conversation_id,
                        &placeholder_id,
                        ChatError::stream(message),
                    );
                }
                Ok(StreamEvent::Unknown) => {}
                Err(error) => {
                    return self.fail_streaming(&run, conversation_id, &placeholder_id, error);
                }
            }
        }

        if run.token().is_cancelled() {
            // The placeholder keeps its accumulated content, still `sending`.
            self.coordinator.finish(&run, RunState::Cancelled);
            return None;
        }

        if let Some(meta) = completion {
            self.coordinator.finish(&run, RunState::Completed);
            return Some(meta);
        }

        if !has_started {
            return self.fail_streaming(
                &run,
                conversation_id,
                &placeholder_id,
                ChatError::StreamStartFailed,
            );
        }

        // The stream ended after `start` without a `complete` event; treat
        // the content received so far as the full response.
        self.store
            .lock()
            .complete_message(conversation_id, &placeholder_id);
        self.coordinator.finish(&run, RunState::Completed);
        None
    }

    /// Cancel the active streaming exchange, if any.
    ///
    /// Optimistic: `is_streaming` reads false immediately, before the
    /// decoder has observed the token.
    pub fn stop_streaming(&self) {
        self.coordinator.cancel();
    }

    // ------------------------------------------------------------------
    // Workflow and health
    // ------------------------------------------------------------------

    /// Fetch a workflow specification by id
    pub async fn load_workflow(&self, spec_id: &str) -> ChatResult<WorkflowSpec> {
        match &self.workflows {
            Some(api) => api.get_workflow(spec_id).await,
            None => Err(ChatError::other("no workflow API configured")),
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Build the request body, or bail out when the target conversation is
    /// unknown or no validated session id is available yet.
    fn build_request(&self, conversation_id: &str, trimmed: &str) -> Option<ChatRequest> {
        if !self.store.lock().contains(conversation_id) {
            tracing::warn!(%conversation_id, "dropping message for unknown conversation");
            return None;
        }
        let Some(session_id) = self.session.session_id() else {
            tracing::warn!("no ready session, dropping message");
            *self.error.lock() = Some(self.messages.session_expired.clone());
            return None;
        };
        Some(ChatRequest {
            message: trimmed.to_string(),
            session_id,
            conversation_id: conversation_id.to_string(),
            language: self.language,
        })
    }

    /// Route a streaming failure through the error path, unless the run was
    /// cancelled first: a cancel observed here wins over the failure.
    fn fail_streaming(
        &self,
        run: &RunHandle,
        conversation_id: &str,
        placeholder_id: &str,
        error: ChatError,
    ) -> Option<CompletionMeta> {
        if run.token().is_cancelled() || error.is_cancelled() {
            self.coordinator.finish(run, RunState::Cancelled);
            return None;
        }
        tracing::error!(kind = %error.kind(), "streaming exchange failed");
        self.store
            .lock()
            .fail_message(conversation_id, placeholder_id);
        *self.streaming_error.lock() = Some(self.messages.message_for(&error));
        self.coordinator.finish(run, RunState::Errored);
        None
    }

    /// Record workflow binding state when a response carries it explicitly
    fn record_binding(
        &self,
        conversation_id: &str,
        workflow_bound_id: Option<&str>,
        is_chat_locked: Option<bool>,
    ) {
        if workflow_bound_id.is_none() && is_chat_locked.is_none() {
            return;
        }
        let mut bindings = self.bindings.lock();
        let entry = bindings.entry(conversation_id.to_string()).or_default();
        if let Some(id) = workflow_bound_id {
            entry.workflow_bound_id = Some(id.to_string());
        }
        if let Some(locked) = is_chat_locked {
            entry.is_chat_locked = locked;
        }
    }
}
