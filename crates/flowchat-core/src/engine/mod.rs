//! Chat engine: streaming coordination and conversation reconciliation

mod chat_engine;
mod coordinator;

pub use chat_engine::ChatEngine;
pub use coordinator::{RunHandle, RunState, StreamCoordinator};
