//! Capacity enforcement.
//!
//! A reconciliation pass runs three steps in order:
//!
//! 1. archive every non-terminal thread idle for longer than the timeout;
//! 2. if more live (active or paused) threads exist than allowed, keep the
//!    focused thread plus the best of the rest by `(engagement, last_active)`
//!    and demote the others to `BACKGROUND`;
//! 3. if more background threads exist than allowed, archive the oldest.
//!
//! Every ordering ends with `thread_id` so the outcome never depends on
//! storage order. The active pointer is left alone even when its thread is
//! archived; routing notices and recovers.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tangent_core::ids::ThreadId;
use tangent_core::thread::{Thread, ThreadState};
use tracing::{info, warn};

use crate::config::CapacityConfig;
use crate::store::ThreadStore;

/// Threads touched by one reconciliation pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Archived for inactivity.
    pub archived_expired: Vec<ThreadId>,
    /// Demoted from live to background.
    pub demoted: Vec<ThreadId>,
    /// Archived because the background list overflowed.
    pub archived_overflow: Vec<ThreadId>,
}

impl ReconcileReport {
    /// Whether the pass changed nothing.
    pub fn is_empty(&self) -> bool {
        self.archived_expired.is_empty()
            && self.demoted.is_empty()
            && self.archived_overflow.is_empty()
    }
}

/// Enforces live/background limits and the inactivity timeout.
#[derive(Clone, Debug, Default)]
pub struct CapacityManager {
    config: CapacityConfig,
}

/// Order by engagement, then recency, both descending, then id ascending.
pub fn by_engagement_then_recency(a: &Thread, b: &Thread) -> Ordering {
    b.engagement_level
        .total_cmp(&a.engagement_level)
        .then_with(|| b.last_active.cmp(&a.last_active))
        .then_with(|| a.thread_id.cmp(&b.thread_id))
}

impl CapacityManager {
    /// Create a manager with the given limits.
    pub fn new(config: CapacityConfig) -> Self {
        Self { config }
    }

    /// The limits in force.
    pub fn config(&self) -> &CapacityConfig {
        &self.config
    }

    /// Run one reconciliation pass over `store`.
    pub fn reconcile<S: ThreadStore + ?Sized>(
        &self,
        store: &mut S,
        now: DateTime<Utc>,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        // 1. inactivity
        let expired: Vec<ThreadId> = store
            .list()
            .into_iter()
            .filter(|t| {
                !t.state.is_terminal()
                    && now.signed_duration_since(t.last_active) > self.config.thread_timeout
            })
            .map(|t| t.thread_id.clone())
            .collect();
        for id in expired {
            if move_thread(store, &id, ThreadState::Archived) {
                info!(thread_id = %id, "thread archived after inactivity");
                report.archived_expired.push(id);
            }
        }

        // 2. live limit
        let focused = store.active_thread_id().cloned();
        let mut live: Vec<&Thread> = store.list().into_iter().filter(|t| t.is_live()).collect();
        if live.len() > self.config.max_active_threads {
            // The focused thread is kept even when its engagement ranks last;
            // demoting it would turn the owner's next message into a state conflict.
            live.sort_by(|a, b| {
                let a_focus = focused.as_ref() == Some(&a.thread_id);
                let b_focus = focused.as_ref() == Some(&b.thread_id);
                b_focus.cmp(&a_focus).then_with(|| by_engagement_then_recency(a, b))
            });
            let demote: Vec<ThreadId> = live[self.config.max_active_threads..]
                .iter()
                .map(|t| t.thread_id.clone())
                .collect();
            for id in demote {
                if move_thread(store, &id, ThreadState::Background) {
                    info!(thread_id = %id, "thread demoted to background");
                    report.demoted.push(id);
                }
            }
        }

        // 3. background limit
        let mut background: Vec<&Thread> = store
            .list()
            .into_iter()
            .filter(|t| t.state == ThreadState::Background)
            .collect();
        if background.len() > self.config.max_background_threads {
            background.sort_by(|a, b| {
                a.last_active
                    .cmp(&b.last_active)
                    .then_with(|| a.thread_id.cmp(&b.thread_id))
            });
            let excess = background.len() - self.config.max_background_threads;
            let archive: Vec<ThreadId> = background[..excess]
                .iter()
                .map(|t| t.thread_id.clone())
                .collect();
            for id in archive {
                if move_thread(store, &id, ThreadState::Archived) {
                    info!(thread_id = %id, "background thread archived for capacity");
                    report.archived_overflow.push(id);
                }
            }
        }

        report
    }
}

fn move_thread<S: ThreadStore + ?Sized>(store: &mut S, id: &ThreadId, to: ThreadState) -> bool {
    let Some(mut thread) = store.get(id).cloned() else {
        return false;
    };
    match thread.transition_to(to) {
        Ok(()) => {
            store.upsert(thread);
            true
        }
        Err(e) => {
            warn!(thread_id = %id, error = %e, "capacity transition refused");
            false
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
