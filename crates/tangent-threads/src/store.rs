//! Per-owner thread storage.
//!
//! A [`ThreadStore`] owns every thread, every transition, and the active
//! pointer for exactly one owner. Callers get shared references or clones;
//! all mutation goes through the store's methods. Serializing access across
//! callers is the registry's job (see [`crate::engine`]), not the store's.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use tangent_core::ids::ThreadId;
use tangent_core::thread::{Thread, Transition};

use crate::config::HistoryConfig;

/// Storage interface for one owner's threads and transition history.
pub trait ThreadStore: Send {
    /// Look up a thread.
    fn get(&self, thread_id: &ThreadId) -> Option<&Thread>;

    /// Every stored thread, ordered by `thread_id`.
    fn list(&self) -> Vec<&Thread>;

    /// Insert a thread or replace the one with the same id.
    fn upsert(&mut self, thread: Thread);

    /// Remove a thread. Clears the active pointer if it referenced it.
    fn delete(&mut self, thread_id: &ThreadId) -> Option<Thread>;

    /// The thread currently in focus, if any.
    fn active_thread_id(&self) -> Option<&ThreadId>;

    /// Move the focus.
    fn set_active_thread_id(&mut self, thread_id: Option<ThreadId>);

    /// Append a transition, pruning history that fell out of retention.
    fn append_transition(&mut self, transition: Transition);

    /// Retained transitions, oldest first.
    fn transitions(&self) -> Vec<&Transition>;

    /// Number of threads created so far; feeds thread id derivation.
    fn sequence(&self) -> u64;

    /// Count one more created thread.
    fn advance_sequence(&mut self);
}

/// [`ThreadStore`] held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryThreadStore {
    threads: BTreeMap<ThreadId, Thread>,
    active: Option<ThreadId>,
    transitions: VecDeque<Transition>,
    sequence: u64,
    history: HistoryConfig,
}

impl InMemoryThreadStore {
    /// Create an empty store with the given history retention.
    pub fn new(history: HistoryConfig) -> Self {
        Self {
            history,
            ..Self::default()
        }
    }

    /// Transitions that occurred at or after `cutoff`, newest first.
    pub fn transitions_since(&self, cutoff: DateTime<Utc>) -> Vec<&Transition> {
        self.transitions
            .iter()
            .rev()
            .filter(|t| t.occurred_at >= cutoff)
            .collect()
    }

    fn prune(&mut self, newest: DateTime<Utc>) {
        while let Some(front) = self.transitions.front() {
            if newest.signed_duration_since(front.occurred_at) > self.history.transition_window {
                let _ = self.transitions.pop_front();
            } else {
                break;
            }
        }
        while self.transitions.len() > self.history.max_transitions {
            let _ = self.transitions.pop_front();
        }
    }
}

impl ThreadStore for InMemoryThreadStore {
    fn get(&self, thread_id: &ThreadId) -> Option<&Thread> {
        self.threads.get(thread_id)
    }

    fn list(&self) -> Vec<&Thread> {
        self.threads.values().collect()
    }

    fn upsert(&mut self, thread: Thread) {
        let _ = self.threads.insert(thread.thread_id.clone(), thread);
    }

    fn delete(&mut self, thread_id: &ThreadId) -> Option<Thread> {
        if self.active.as_ref() == Some(thread_id) {
            self.active = None;
        }
        self.threads.remove(thread_id)
    }

    fn active_thread_id(&self) -> Option<&ThreadId> {
        self.active.as_ref()
    }

    fn set_active_thread_id(&mut self, thread_id: Option<ThreadId>) {
        self.active = thread_id;
    }

    fn append_transition(&mut self, transition: Transition) {
        let newest = transition.occurred_at;
        self.transitions.push_back(transition);
        self.prune(newest);
    }

    fn transitions(&self) -> Vec<&Transition> {
        self.transitions.iter().collect()
    }

    fn sequence(&self) -> u64 {
        self.sequence
    }

    fn advance_sequence(&mut self) {
        self.sequence = self.sequence.saturating_add(1);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
