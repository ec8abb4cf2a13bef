//! Streaming session coordination
//!
//! At most one streaming exchange is active per coordinator. Starting a new
//! run cancels the previous run's token first, so two placeholders can never
//! race on the same conversation; `cancel` is optimistic, dropping the
//! externally visible streaming flag before the transport has noticed.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// State of a streaming run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Active,
    Completed,
    Errored,
    Cancelled,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Active => write!(f, "active"),
            RunState::Completed => write!(f, "completed"),
            RunState::Errored => write!(f, "errored"),
            RunState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Handle identifying one streaming run.
///
/// Outcome reports from a superseded run are ignored; only the run holding
/// the current id can move the coordinator out of `Active`.
#[derive(Debug, Clone)]
pub struct RunHandle {
    token: CancellationToken,
    run_id: u64,
}

impl RunHandle {
    /// The cancellation token scoped to this run
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

#[derive(Debug)]
struct CoordinatorInner {
    state: RunState,
    token: Option<CancellationToken>,
    run_id: u64,
}

/// Orchestrates one streaming exchange at a time
#[derive(Debug)]
pub struct StreamCoordinator {
    inner: Mutex<CoordinatorInner>,
    streaming: AtomicBool,
}

impl StreamCoordinator {
    /// Create an idle coordinator
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(CoordinatorInner {
                state: RunState::Idle,
                token: None,
                run_id: 0,
            }),
            streaming: AtomicBool::new(false),
        }
    }

    /// Start a new run, cancelling any run still active.
    pub fn begin(&self) -> RunHandle {
        let mut inner = self.inner.lock();
        if inner.state == RunState::Active {
            if let Some(token) = inner.token.take() {
                tracing::debug!("cancelling superseded streaming run");
                token.cancel();
            }
        }

        let token = CancellationToken::new();
        inner.run_id += 1;
        inner.state = RunState::Active;
        inner.token = Some(token.clone());
        self.streaming.store(true, Ordering::SeqCst);

        RunHandle {
            token,
            run_id: inner.run_id,
        }
    }

    /// Cancel the active run.
    ///
    /// The streaming flag drops immediately; the decoder observes the token
    /// at its next read boundary.
    pub fn cancel(&self) {
        let mut inner = self.inner.lock();
        if let Some(token) = inner.token.take() {
            token.cancel();
        }
        if inner.state == RunState::Active {
            inner.state = RunState::Cancelled;
        }
        self.streaming.store(false, Ordering::SeqCst);
    }

    /// Record the outcome of a run; ignored if the run was superseded
    pub fn finish(&self, handle: &RunHandle, outcome: RunState) {
        let mut inner = self.inner.lock();
        if inner.run_id != handle.run_id {
            return;
        }
        if inner.state == RunState::Active {
            inner.state = outcome;
        }
        inner.token = None;
        self.streaming.store(false, Ordering::SeqCst);
    }

    /// Whether a run is externally visible as in flight
    pub fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::SeqCst)
    }

    /// Current run state
    pub fn state(&self) -> RunState {
        self.inner.lock().state
    }
}

impl Default for StreamCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_activates() {
        let coordinator = StreamCoordinator::new();
        assert_eq!(coordinator.state(), RunState::Idle);
        assert!(!coordinator.is_streaming());

        let run = coordinator.begin();
        assert_eq!(coordinator.state(), RunState::Active);
        assert!(coordinator.is_streaming());
        assert!(!run.token().is_cancelled());
    }

    #[test]
    fn test_new_run_cancels_prior() {
        let coordinator = StreamCoordinator::new();
        let first = coordinator.begin();
        let second = coordinator.begin();

        assert!(first.token().is_cancelled());
        assert!(!second.token().is_cancelled());
        assert_eq!(coordinator.state(), RunState::Active);
    }

    #[test]
    fn test_cancel_is_optimistic() {
        let coordinator = StreamCoordinator::new();
        let run = coordinator.begin();

        coordinator.cancel();

        // Flag drops before the transport has observed the token.
        assert!(!coordinator.is_streaming());
        assert!(run.token().is_cancelled());
        assert_eq!(coordinator.state(), RunState::Cancelled);
    }

    #[test]
    fn test_finish_completes_run() {
        let coordinator = StreamCoordinator::new();
        let run = coordinator.begin();

        coordinator.finish(&run, RunState::Completed);
        assert_eq!(coordinator.state(), RunState::Completed);
        assert!(!coordinator.is_streaming());
    }

    #[test]
    fn test_superseded_finish_is_ignored() {
        let coordinator = StreamCoordinator::new();
        let stale = coordinator.begin();
        let _current = coordinator.begin();

        coordinator.finish(&stale, RunState::Errored);
        assert_eq!(coordinator.state(), RunState::Active);
        assert!(coordinator.is_streaming());
    }
}
