//! Error types shared across the routing engine.

use thiserror::Error;

use crate::ids::ThreadId;
use crate::thread::ThreadState;

/// A thread state change that is not an edge of the lifecycle graph.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StateTransitionError {
    /// The requested edge does not exist.
    #[error("illegal state transition for {thread_id}: {from} -> {to}")]
    Illegal {
        /// Thread whose state change was refused.
        thread_id: ThreadId,
        /// Current state.
        from: ThreadState,
        /// Requested state.
        to: ThreadState,
    },
}

impl StateTransitionError {
    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Illegal { .. } => "illegal_transition",
        }
    }
}
