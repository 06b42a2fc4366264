//! Read-only projections returned to callers.
//!
//! Nothing here holds a reference into the store: every bundle is built from
//! clones taken under the owner's lock, so callers can keep, serialize, or
//! send it anywhere.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tangent_core::ids::{OwnerId, ThreadId};
use tangent_core::thread::{ConversationPhase, PriorityLevel, Thread, ThreadState, Transition};

use crate::capacity::ReconcileReport;
use crate::guidance::ResponseGuidance;
use crate::priority::PriorityReport;
use crate::router::RouteRule;

/// Keywords listed per thread in summaries.
pub const SUMMARY_KEYWORDS: usize = 5;

/// What the routed message did to its thread.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadAnalysis {
    /// The thread the message landed in.
    pub thread_id: ThreadId,
    /// Accumulated topic keywords.
    pub keywords: Vec<String>,
    /// Accumulated theme tags.
    pub themes: BTreeSet<String>,
    /// Phase after this message.
    pub phase: ConversationPhase,
    /// Blended engagement after this message.
    pub engagement_level: f64,
    /// Messages in the thread, this one included.
    pub message_count: u32,
    /// Whether this message opened the thread.
    pub created: bool,
}

impl ThreadAnalysis {
    /// Analysis of `thread` after routing.
    pub fn of(thread: &Thread, created: bool) -> Self {
        Self {
            thread_id: thread.thread_id.clone(),
            keywords: thread.topic_keywords.clone(),
            themes: thread.theme_tags.clone(),
            phase: thread.conversation_phase,
            engagement_level: thread.engagement_level,
            message_count: thread.message_count,
            created,
        }
    }
}

/// Compact view of one thread.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSummary {
    /// Thread id.
    pub thread_id: ThreadId,
    /// Lifecycle state.
    pub state: ThreadState,
    /// Leading topic keywords.
    pub top_keywords: Vec<String>,
    /// Theme tags.
    pub themes: BTreeSet<String>,
    /// Engagement level.
    pub engagement_level: f64,
    /// Priority bucket.
    pub priority_level: PriorityLevel,
    /// Messages routed to the thread.
    pub message_count: u32,
    /// Last message time.
    pub last_active: DateTime<Utc>,
    /// Why the thread was paused, if it is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause_reason: Option<String>,
}

impl From<&Thread> for ThreadSummary {
    fn from(thread: &Thread) -> Self {
        Self {
            thread_id: thread.thread_id.clone(),
            state: thread.state,
            top_keywords: thread.top_keywords(SUMMARY_KEYWORDS).to_vec(),
            themes: thread.theme_tags.clone(),
            engagement_level: thread.engagement_level,
            priority_level: thread.priority_level,
            message_count: thread.message_count,
            last_active: thread.last_active,
            pause_reason: thread.pause_reason.clone(),
        }
    }
}

/// How the target thread was chosen, and what else happened on the way.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDiagnostics {
    /// Which resolution rule fired.
    pub rule: RouteRule,
    /// Cue strength of the message.
    pub cue_strength: f64,
    /// Best similarity against a live thread, if any was computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_similarity: Option<f64>,
    /// State conflicts detected while routing.
    pub state_conflicts: usize,
    /// Reconciliation performed after routing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconcile: Option<ReconcileReport>,
}

/// Everything a caller learns from routing one message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultBundle {
    /// Owner the message belongs to.
    pub owner_id: OwnerId,
    /// Thread now in focus.
    pub current_thread_id: ThreadId,
    /// Analysis of that thread.
    pub analysis: ThreadAnalysis,
    /// Transition recorded by this message, if the focus moved.
    pub transition: Option<Transition>,
    /// Priority of every live thread.
    pub priorities: BTreeMap<ThreadId, PriorityReport>,
    /// Live threads by engagement and recency.
    pub active_threads: Vec<ThreadSummary>,
    /// Recent transitions, newest first.
    pub recent_transitions: Vec<Transition>,
    /// Hints for the response layer.
    pub guidance: ResponseGuidance,
    /// Routing internals.
    pub diagnostics: RouteDiagnostics,
    /// Served from the idempotency cache without routing again.
    pub replayed: bool,
}
