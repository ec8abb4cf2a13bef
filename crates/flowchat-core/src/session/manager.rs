//! Session lifecycle management
//!
//! Establishes and validates the durable session id that groups
//! conversations server-side. Consumers never observe an id that has not
//! been validated against, or freshly issued by, the backend.

use parking_lot::Mutex;
use std::fmt;

use super::storage::SessionStore;
use crate::api::{SessionBackend, SessionData};
use crate::error::ChatResult;
use crate::ids::ClientFingerprint;

/// Phase of the session lifecycle state machine.
///
/// `Uninitialized → Validating → Ready` when a stored id survives
/// validation, `Uninitialized → Creating → Ready` otherwise. `Failed` is
/// reachable from any non-ready phase and is left only through an explicit
/// [`SessionManager::create_new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Validating,
    Creating,
    Ready,
    Failed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Uninitialized => write!(f, "uninitialized"),
            SessionPhase::Validating => write!(f, "validating"),
            SessionPhase::Creating => write!(f, "creating"),
            SessionPhase::Ready => write!(f, "ready"),
            SessionPhase::Failed => write!(f, "failed"),
        }
    }
}

/// How the session id came to be ready
#[derive(Debug, Clone)]
pub enum SessionStartup {
    /// A stored id was validated; the full record is included so callers can
    /// seed conversation binding state
    Restored(SessionData),
    /// A fresh session was created under the given id
    Created(String),
}

impl SessionStartup {
    /// The session id this startup produced
    pub fn session_id(&self) -> &str {
        match self {
            SessionStartup::Restored(data) => &data.session_id,
            SessionStartup::Created(id) => id,
        }
    }
}

#[derive(Debug)]
struct ManagerState {
    phase: SessionPhase,
    session_id: Option<String>,
    failure: Option<String>,
}

impl Default for ManagerState {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Uninitialized,
            session_id: None,
            failure: None,
        }
    }
}

/// Owns the one active session id held client-side
pub struct SessionManager {
    backend: Box<dyn SessionBackend>,
    store: Box<dyn SessionStore>,
    fingerprint: ClientFingerprint,
    state: Mutex<ManagerState>,
}

impl SessionManager {
    /// Create a manager over the given backend and durable slot
    pub fn new(
        backend: Box<dyn SessionBackend>,
        store: Box<dyn SessionStore>,
        fingerprint: ClientFingerprint,
    ) -> Self {
        Self {
            backend,
            store,
            fingerprint,
            state: Mutex::new(ManagerState::default()),
        }
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> SessionPhase {
        self.state.lock().phase
    }

    /// The validated session id, available only once ready
    pub fn session_id(&self) -> Option<String> {
        let state = self.state.lock();
        match state.phase {
            SessionPhase::Ready => state.session_id.clone(),
            _ => None,
        }
    }

    /// The failure reason, if the manager is in the failed phase
    pub fn failure(&self) -> Option<String> {
        self.state.lock().failure.clone()
    }

    /// Establish a ready session id.
    ///
    /// Restores and validates a stored id when one exists; any validation
    /// failure discards the stored id and falls through to creating a fresh
    /// session under a newly derived user identifier. Creation failure lands
    /// in the failed phase and is not retried automatically.
    pub async fn initialize(&self) -> ChatResult<SessionStartup> {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(error) => {
                tracing::warn!(%error, "could not read stored session id");
                None
            }
        };

        if let Some(session_id) = stored {
            self.set_phase(SessionPhase::Validating);
            match self.backend.get_session(&session_id).await {
                Ok(data) => {
                    tracing::info!(%session_id, "session restored from storage");
                    self.set_ready(session_id);
                    return Ok(SessionStartup::Restored(data));
                }
                Err(error) => {
                    tracing::warn!(%session_id, %error, "stored session rejected, creating a new one");
                    // The in-memory discard already happened; a slot that
                    // cannot be cleared must not block creating a session.
                    if let Err(error) = self.store.clear() {
                        tracing::warn!(%error, "could not clear stored session id");
                    }
                }
            }
        }

        let session_id = self.create_new().await?;
        Ok(SessionStartup::Created(session_id))
    }

    /// Request a brand-new session, replacing whatever was held before.
    ///
    /// Exposed so callers can recover from the failed phase on user action.
    pub async fn create_new(&self) -> ChatResult<String> {
        self.set_phase(SessionPhase::Creating);

        let user_identifier = self.fingerprint.user_identifier();
        match self.backend.create_session(&user_identifier).await {
            Ok(response) => {
                if let Err(error) = self.store.save(&response.session_id) {
                    self.set_failed(error.to_string());
                    return Err(error);
                }
                tracing::info!(session_id = %response.session_id, "session created");
                self.set_ready(response.session_id.clone());
                Ok(response.session_id)
            }
            Err(error) => {
                self.set_failed(error.to_string());
                Err(error)
            }
        }
    }

    /// Drop the held session id, both in memory and from durable storage
    pub fn clear(&self) -> ChatResult<()> {
        {
            let mut state = self.state.lock();
            state.phase = SessionPhase::Uninitialized;
            state.session_id = None;
            state.failure = None;
        }
        self.store.clear()
    }

    /// Delete the session server-side, then drop it locally
    pub async fn clear_remote(&self) -> ChatResult<()> {
        if let Some(session_id) = self.session_id() {
            self.backend.delete_session(&session_id).await?;
        }
        self.clear()
    }

    fn set_phase(&self, phase: SessionPhase) {
        let mut state = self.state.lock();
        state.phase = phase;
        state.session_id = None;
        state.failure = None;
    }

    fn set_ready(&self, session_id: String) {
        let mut state = self.state.lock();
        state.phase = SessionPhase::Ready;
        state.session_id = Some(session_id);
        state.failure = None;
    }

    fn set_failed(&self, reason: String) {
        let mut state = self.state.lock();
        state.phase = SessionPhase::Failed;
        state.session_id = None;
        state.failure = Some(reason);
    }
}
