//! Thread and transition entities.
//!
//! A [`Thread`] is one topical conversation segment belonging to an owner.
//! A [`Transition`] records the moment the owner's focus moved from one
//! thread to another. Both are plain data; ownership and mutation policy
//! live in the store that holds them.
//!
//! # Lifecycle
//!
//! ```text
//!   ACTIVE ⇄ PAUSED
//!     │  ╲      │
//!     │   ╲     ▼
//!     │    ─▶ BACKGROUND ──▶ ACTIVE (renewed relevance)
//!     ▼
//!   RESOLVED / MERGED / ARCHIVED   (terminal)
//! ```
//!
//! `ARCHIVED` is reachable from every non-terminal state. `PAUSED →
//! BACKGROUND` exists because switching focus pauses the outgoing thread,
//! and capacity demotion has to reach those paused threads.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::StateTransitionError;
use crate::ids::{OwnerId, ThreadId, TransitionId};

/// Maximum number of open questions or pending actions kept per thread.
pub const MAX_TRACKED_ITEMS: usize = 10;

/// Number of trailing topic keywords captured when a thread is left.
pub const PRESERVED_KEYWORD_COUNT: usize = 5;

// ─────────────────────────────────────────────────────────────────────────────
// ThreadState
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle state of a thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadState {
    /// In focus, or live and eligible for routing.
    Active,
    /// Live but not in focus; left by a transition.
    Paused,
    /// Held aside; can only be archived.
    Suspended,
    /// Demoted by capacity enforcement.
    Background,
    /// Concluded by the owner.
    Resolved,
    /// Folded into another thread.
    Merged,
    /// Soft-retired.
    Archived,
}

impl ThreadState {
    /// Every state, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Active,
        Self::Paused,
        Self::Suspended,
        Self::Background,
        Self::Resolved,
        Self::Merged,
        Self::Archived,
    ];

    /// Terminal states have no outgoing edges.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Merged | Self::Archived)
    }

    /// Live threads are the routing candidates and count against the active limit.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Active | Self::Paused)
    }

    /// Whether `self → to` is an edge of the lifecycle graph.
    pub fn can_transition_to(self, to: Self) -> bool {
        use ThreadState::{Active, Archived, Background, Merged, Paused, Resolved, Suspended};
        match (self, to) {
            (Active, Paused | Background | Archived | Resolved | Merged)
            | (Paused, Active | Background | Archived | Resolved | Merged)
            | (Background, Active | Archived)
            | (Suspended, Archived) => true,
            (Active | Paused | Suspended | Background | Resolved | Merged | Archived, _) => false,
        }
    }
}

impl fmt::Display for ThreadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Suspended => "suspended",
            Self::Background => "background",
            Self::Resolved => "resolved",
            Self::Merged => "merged",
            Self::Archived => "archived",
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PriorityLevel / ConversationPhase / TransitionType
// ─────────────────────────────────────────────────────────────────────────────

/// Discrete priority bucket derived from a continuous score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    /// Score above 0.8.
    Critical,
    /// Score above 0.6.
    High,
    /// Score above 0.4.
    Medium,
    /// Score above 0.2.
    Low,
    /// Everything else.
    Minimal,
}

impl PriorityLevel {
    /// Bucket a score in `[0, 1]`.
    pub fn from_score(score: f64) -> Self {
        if score > 0.8 {
            Self::Critical
        } else if score > 0.6 {
            Self::High
        } else if score > 0.4 {
            Self::Medium
        } else if score > 0.2 {
            Self::Low
        } else {
            Self::Minimal
        }
    }
}

/// How far a thread has developed, derived from its message count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    /// Up to 3 messages.
    Opening,
    /// Up to 10 messages.
    Developing,
    /// Up to 20 messages.
    Deepening,
    /// More than 20 messages.
    Established,
}

impl ConversationPhase {
    /// Phase for a thread holding `message_count` messages.
    pub fn from_message_count(message_count: u32) -> Self {
        match message_count {
            0..=3 => Self::Opening,
            4..=10 => Self::Developing,
            11..=20 => Self::Deepening,
            _ => Self::Established,
        }
    }
}

/// Why the owner's focus moved between threads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionType {
    /// The message carried an explicit discourse marker.
    ExplicitSwitch,
    /// The message was prompted by a reminder.
    ReminderDriven,
    /// Only temporal markers signalled the change.
    TimeDriven,
    /// No lexical cue, but high emotional urgency.
    EmotionalDriven,
    /// No strong signal.
    NaturalFlow,
}

impl fmt::Display for TransitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ExplicitSwitch => "explicit_switch",
            Self::ReminderDriven => "reminder_driven",
            Self::TimeDriven => "time_driven",
            Self::EmotionalDriven => "emotional_driven",
            Self::NaturalFlow => "natural_flow",
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Thread
// ─────────────────────────────────────────────────────────────────────────────

/// A tracked topical conversation segment belonging to one owner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    /// Immutable identity.
    pub thread_id: ThreadId,
    /// Owner of the thread.
    pub owner_id: OwnerId,
    /// Keywords of the message that opened the thread.
    pub topic_seed_keywords: Vec<String>,
    /// Union of keywords over all messages, in first-seen order.
    pub topic_keywords: Vec<String>,
    /// Union of theme labels over all messages.
    pub theme_tags: BTreeSet<String>,
    /// Lifecycle state.
    pub state: ThreadState,
    /// Current priority bucket.
    pub priority_level: PriorityLevel,
    /// Emotional urgency factor in `[0, 1]`.
    pub emotional_urgency: f64,
    /// Time sensitivity factor in `[0, 1]`.
    pub time_sensitivity: f64,
    /// Engagement factor in `[0, 1]`.
    pub engagement_level: f64,
    /// Completion factor in `[0, 1]`.
    pub completion_status: f64,
    /// Development phase.
    pub conversation_phase: ConversationPhase,
    /// Questions the owner asked that are still open.
    pub unresolved_questions: Vec<String>,
    /// Things the owner said they would do.
    pub pending_actions: Vec<String>,
    /// Last time a message was routed here.
    pub last_active: DateTime<Utc>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Number of messages routed here.
    pub message_count: u32,
    /// Why the thread was paused, if it is.
    pub pause_reason: Option<String>,
    /// Threads this one was switched to or from.
    pub related_thread_ids: Vec<ThreadId>,
    /// Most recent primary emotion observed in this thread.
    pub last_emotion: Option<String>,
}

impl Thread {
    /// Open a new, empty thread seeded with the given keywords and themes.
    pub fn new(
        thread_id: ThreadId,
        owner_id: OwnerId,
        seed_keywords: Vec<String>,
        themes: impl IntoIterator<Item = String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            thread_id,
            owner_id,
            topic_keywords: seed_keywords.clone(),
            topic_seed_keywords: seed_keywords,
            theme_tags: themes.into_iter().collect(),
            state: ThreadState::Active,
            priority_level: PriorityLevel::Minimal,
            emotional_urgency: 0.0,
            time_sensitivity: 0.0,
            engagement_level: 0.0,
            completion_status: 0.0,
            conversation_phase: ConversationPhase::Opening,
            unresolved_questions: Vec::new(),
            pending_actions: Vec::new(),
            last_active: now,
            created_at: now,
            message_count: 0,
            pause_reason: None,
            related_thread_ids: Vec::new(),
            last_emotion: None,
        }
    }

    /// Move to `to`, refusing edges outside the lifecycle graph.
    ///
    /// Moving to the current state is a no-op. Leaving `PAUSED` clears the
    /// pause reason.
    pub fn transition_to(&mut self, to: ThreadState) -> Result<(), StateTransitionError> {
        if self.state == to {
            return Ok(());
        }
        if !self.state.can_transition_to(to) {
            return Err(StateTransitionError::Illegal {
                thread_id: self.thread_id.clone(),
                from: self.state,
                to,
            });
        }
        if self.state == ThreadState::Paused {
            self.pause_reason = None;
        }
        self.state = to;
        Ok(())
    }

    /// Whether the thread is a routing candidate.
    pub fn is_live(&self) -> bool {
        self.state.is_live()
    }

    /// Union `keywords` into the topic keywords. Re-adding is a no-op.
    pub fn merge_keywords(&mut self, keywords: &[String]) {
        for kw in keywords {
            if !self.topic_keywords.contains(kw) {
                self.topic_keywords.push(kw.clone());
            }
        }
    }

    /// Union `themes` into the theme tags.
    pub fn merge_themes<'a>(&mut self, themes: impl IntoIterator<Item = &'a String>) {
        self.theme_tags.extend(themes.into_iter().cloned());
    }

    /// The first `n` topic keywords (seed keywords come first).
    pub fn top_keywords(&self, n: usize) -> &[String] {
        &self.topic_keywords[..n.min(self.topic_keywords.len())]
    }

    /// The last `n` topic keywords.
    pub fn recent_keywords(&self, n: usize) -> &[String] {
        let len = self.topic_keywords.len();
        &self.topic_keywords[len.saturating_sub(n)..]
    }

    /// Count a new message: bump the counter, refresh the phase, touch `last_active`.
    pub fn record_message(&mut self, now: DateTime<Utc>) {
        self.message_count = self.message_count.saturating_add(1);
        self.conversation_phase = ConversationPhase::from_message_count(self.message_count);
        self.last_active = now;
    }

    /// Remember open questions, keeping the newest [`MAX_TRACKED_ITEMS`].
    pub fn track_questions(&mut self, questions: &[String]) {
        push_bounded(&mut self.unresolved_questions, questions);
    }

    /// Remember pending actions, keeping the newest [`MAX_TRACKED_ITEMS`].
    pub fn track_actions(&mut self, actions: &[String]) {
        push_bounded(&mut self.pending_actions, actions);
    }

    /// Link another thread without taking ownership of it.
    pub fn relate_to(&mut self, other: &ThreadId) {
        if other != &self.thread_id && !self.related_thread_ids.contains(other) {
            self.related_thread_ids.push(other.clone());
        }
    }
}

fn push_bounded(items: &mut Vec<String>, new_items: &[String]) {
    for item in new_items {
        if !items.contains(item) {
            items.push(item.clone());
        }
    }
    if items.len() > MAX_TRACKED_ITEMS {
        let excess = items.len() - MAX_TRACKED_ITEMS;
        let _ = items.drain(..excess);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transition
// ─────────────────────────────────────────────────────────────────────────────

/// Snapshot of the outgoing thread, copied by value at transition time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PreservedContext {
    /// Open questions of the outgoing thread.
    pub unresolved_questions: Vec<String>,
    /// Pending actions of the outgoing thread.
    pub pending_actions: Vec<String>,
    /// Last observed primary emotion.
    pub emotional_state: Option<String>,
    /// Emotional urgency at the time of leaving.
    pub emotional_urgency: f64,
    /// Theme tags of the outgoing thread.
    pub themes: Vec<String>,
    /// Last topic keywords of the outgoing thread.
    pub recent_keywords: Vec<String>,
}

impl PreservedContext {
    /// Capture the parts of `thread` worth carrying across a switch.
    pub fn capture(thread: &Thread) -> Self {
        Self {
            unresolved_questions: thread.unresolved_questions.clone(),
            pending_actions: thread.pending_actions.clone(),
            emotional_state: thread.last_emotion.clone(),
            emotional_urgency: thread.emotional_urgency,
            themes: thread.theme_tags.iter().cloned().collect(),
            recent_keywords: thread.recent_keywords(PRESERVED_KEYWORD_COUNT).to_vec(),
        }
    }
}

/// An append-only record of the owner's focus moving between threads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Identity.
    pub transition_id: TransitionId,
    /// Owner whose focus moved.
    pub owner_id: OwnerId,
    /// Thread that lost focus, if any.
    pub from_thread_id: Option<ThreadId>,
    /// Thread that gained focus.
    pub to_thread_id: ThreadId,
    /// Classification of the switch.
    pub transition_type: TransitionType,
    /// Message that caused the switch.
    pub trigger_text: String,
    /// Short segue between the two topics.
    pub bridge_text: String,
    /// Snapshot of the outgoing thread.
    pub preserved_context: PreservedContext,
    /// When the switch happened.
    pub occurred_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn thread(keywords: &[&str]) -> Thread {
        Thread::new(
            ThreadId::from("thr_test"),
            OwnerId::from("alice"),
            keywords.iter().map(|k| (*k).to_owned()).collect(),
            vec!["work".to_owned()],
            now(),
        )
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for from in ThreadState::ALL.into_iter().filter(|s| s.is_terminal()) {
            for to in ThreadState::ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to} must be refused");
            }
        }
    }

    #[test]
    fn documented_edges_are_allowed() {
        use ThreadState::*;
        let edges = [
            (Active, Paused),
            (Paused, Active),
            (Active, Background),
            (Paused, Background),
            (Background, Active),
            (Active, Archived),
            (Paused, Archived),
            (Background, Archived),
            (Suspended, Archived),
            (Active, Resolved),
            (Paused, Resolved),
            (Active, Merged),
            (Paused, Merged),
        ];
        for (from, to) in edges {
            assert!(from.can_transition_to(to), "{from} -> {to} must be allowed");
        }
    }

    #[test]
    fn undocumented_edges_are_refused() {
        use ThreadState::*;
        assert!(!Background.can_transition_to(Paused));
        assert!(!Suspended.can_transition_to(Active));
        assert!(!Background.can_transition_to(Resolved));
        assert!(!Active.can_transition_to(Suspended));
    }

    #[test]
    fn transition_to_rejects_archived_to_active() {
        let mut t = thread(&["whiskey"]);
        t.transition_to(ThreadState::Archived).unwrap();
        let err = t.transition_to(ThreadState::Active).unwrap_err();
        assert_matches!(
            err,
            StateTransitionError::Illegal { from: ThreadState::Archived, to: ThreadState::Active, .. }
        );
        assert_eq!(t.state, ThreadState::Archived);
    }

    #[test]
    fn leaving_paused_clears_reason() {
        let mut t = thread(&["whiskey"]);
        t.transition_to(ThreadState::Paused).unwrap();
        t.pause_reason = Some("transitioned to thr_x".to_owned());
        t.transition_to(ThreadState::Active).unwrap();
        assert!(t.pause_reason.is_none());
    }

    #[test]
    fn same_state_is_noop() {
        let mut t = thread(&["whiskey"]);
        assert!(t.transition_to(ThreadState::Active).is_ok());
    }

    #[test]
    fn merge_keywords_is_idempotent_union() {
        let mut t = thread(&["work", "boss"]);
        t.merge_keywords(&["boss".to_owned(), "deadline".to_owned()]);
        t.merge_keywords(&["deadline".to_owned()]);
        assert_eq!(t.topic_keywords, vec!["work", "boss", "deadline"]);
        assert_eq!(t.topic_seed_keywords, vec!["work", "boss"]);
    }

    #[test]
    fn top_and_recent_keywords() {
        let t = thread(&["a1", "b2", "c3", "d4", "e5", "f6", "g7"]);
        assert_eq!(t.top_keywords(5), ["a1", "b2", "c3", "d4", "e5"]);
        assert_eq!(t.recent_keywords(2), ["f6", "g7"]);
        assert_eq!(t.top_keywords(50).len(), 7);
    }

    #[test]
    fn phase_boundaries() {
        assert_eq!(ConversationPhase::from_message_count(3), ConversationPhase::Opening);
        assert_eq!(ConversationPhase::from_message_count(4), ConversationPhase::Developing);
        assert_eq!(ConversationPhase::from_message_count(10), ConversationPhase::Developing);
        assert_eq!(ConversationPhase::from_message_count(20), ConversationPhase::Deepening);
        assert_eq!(ConversationPhase::from_message_count(21), ConversationPhase::Established);
    }

    #[test]
    fn record_message_updates_phase() {
        let mut t = thread(&["x1x"]);
        for _ in 0..4 {
            t.record_message(now());
        }
        assert_eq!(t.message_count, 4);
        assert_eq!(t.conversation_phase, ConversationPhase::Developing);
    }

    #[test]
    fn priority_buckets() {
        assert_eq!(PriorityLevel::from_score(0.81), PriorityLevel::Critical);
        assert_eq!(PriorityLevel::from_score(0.8), PriorityLevel::High);
        assert_eq!(PriorityLevel::from_score(0.5), PriorityLevel::Medium);
        assert_eq!(PriorityLevel::from_score(0.3), PriorityLevel::Low);
        assert_eq!(PriorityLevel::from_score(0.2), PriorityLevel::Minimal);
    }

    #[test]
    fn tracked_items_are_bounded() {
        let mut t = thread(&["x1x"]);
        let questions: Vec<String> = (0..15).map(|i| format!("question {i}?")).collect();
        t.track_questions(&questions);
        assert_eq!(t.unresolved_questions.len(), MAX_TRACKED_ITEMS);
        assert_eq!(t.unresolved_questions[0], "question 5?");
    }

    #[test]
    fn preserved_context_copies_by_value() {
        let mut t = thread(&["a1", "b2", "c3", "d4", "e5", "f6"]);
        t.track_questions(&["why?".to_owned()]);
        t.last_emotion = Some("anxious".to_owned());
        let ctx = PreservedContext::capture(&t);
        t.unresolved_questions.clear();
        assert_eq!(ctx.unresolved_questions, vec!["why?"]);
        assert_eq!(ctx.recent_keywords, vec!["b2", "c3", "d4", "e5", "f6"]);
        assert_eq!(ctx.emotional_state.as_deref(), Some("anxious"));
        assert_eq!(ctx.themes, vec!["work"]);
    }

    #[test]
    fn relate_to_skips_self_and_duplicates() {
        let mut t = thread(&["x1x"]);
        let other = ThreadId::from("thr_other");
        t.relate_to(&other);
        t.relate_to(&other);
        t.relate_to(&ThreadId::from("thr_test"));
        assert_eq!(t.related_thread_ids, vec![other]);
    }

    #[test]
    fn state_serializes_snake_case() {
        let json = serde_json::to_string(&ThreadState::Background).unwrap();
        assert_eq!(json, "\"background\"");
        let json = serde_json::to_string(&TransitionType::ExplicitSwitch).unwrap();
        assert_eq!(json, "\"explicit_switch\"");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn state() -> impl Strategy<Value = ThreadState> {
            proptest::sample::select(ThreadState::ALL.to_vec())
        }

        proptest! {
            #[test]
            fn random_walk_stays_on_lifecycle_edges(steps in proptest::collection::vec(state(), 1..40)) {
                let mut t = thread(&["walk"]);
                for to in steps {
                    let from = t.state;
                    let before = t.clone();
                    match t.transition_to(to) {
                        Ok(()) => prop_assert!(from == to || from.can_transition_to(to)),
                        Err(_) => {
                            prop_assert!(!from.can_transition_to(to));
                            prop_assert_eq!(&t, &before);
                        }
                    }
                    if from.is_terminal() {
                        prop_assert_eq!(t.state, from);
                    }
                    if t.state == ThreadState::Paused && t.pause_reason.is_none() {
                        t.pause_reason = Some("walk".to_owned());
                    }
                    prop_assert!(t.state == ThreadState::Paused || t.pause_reason.is_none());
                }
            }
        }
    }
}
