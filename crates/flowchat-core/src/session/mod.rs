//! Session lifecycle and durable session storage

mod manager;
mod storage;

pub use manager::{SessionManager, SessionPhase, SessionStartup};
pub use storage::{FileSessionStore, MemorySessionStore, SessionStore};
