//! Durable storage slot for the current session id
//!
//! One fixed key, one string value. Survives process restarts so a client
//! can resume its server-side session.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use parking_lot::Mutex;

use crate::error::{ChatError, ChatResult};

/// File name of the session slot inside the data directory
const SESSION_FILE: &str = "session-id";

/// A durable key-value slot holding at most one session id
pub trait SessionStore: Send + Sync {
    /// Read the stored session id, if any
    fn load(&self) -> ChatResult<Option<String>>;

    /// Store a session id, replacing any previous one
    fn save(&self, session_id: &str) -> ChatResult<()>;

    /// Remove the stored session id
    fn clear(&self) -> ChatResult<()>;
}

/// File-backed session slot under the platform data directory
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store writing to the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store at the default platform location
    pub fn default_location() -> ChatResult<Self> {
        let dir = dirs::data_dir()
            .ok_or_else(|| ChatError::storage("no platform data directory available"))?;
        Ok(Self::new(dir.join("flowchat").join(SESSION_FILE)))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> ChatResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let id = contents.trim();
                if id.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(id.to_string()))
                }
            }
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(ChatError::storage(error.to_string())),
        }
    }

    fn save(&self, session_id: &str) -> ChatResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|error| ChatError::storage(error.to_string()))?;
        }
        fs::write(&self.path, session_id).map_err(|error| ChatError::storage(error.to_string()))
    }

    fn clear(&self) -> ChatResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(ChatError::storage(error.to_string())),
        }
    }
}

/// In-memory session slot for tests and embedders without a filesystem
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<String>>,
}

impl MemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a session id
    pub fn with_session(session_id: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(session_id.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> ChatResult<Option<String>> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, session_id: &str) -> ChatResult<()> {
        *self.slot.lock() = Some(session_id.to_string());
        Ok(())
    }

    fn clear(&self) -> ChatResult<()> {
        *self.slot.lock() = None;
        Ok(())
    }
}
