//! Thread resolution.
//!
//! Routing is split into a pure planning step and an infallible commit step.
//! [`ThreadRouter::plan`] reads the store and returns a [`RoutePlan`] holding
//! the final state of every thread it touches; [`ThreadRouter::commit`]
//! writes that plan back. A caller that abandons routing before the commit
//! leaves the store exactly as it was.
//!
//! # Resolution rules
//!
//! Evaluated in order, first match wins:
//!
//! 1. **Explicit reference**: the message names enough of a live or
//!    background thread's leading keywords. Background hits are revived.
//! 2. **Strong transition**: cue strength above the threshold opens a new
//!    thread.
//! 3. **Similar continuation**: the most similar live thread scores above the
//!    continuation threshold and was active within the window.
//! 4. **Divergence**: the focused thread is too dissimilar; open a new one.
//! 5. **Continue current**: stay on the focused thread, or open a new one if
//!    there is none.
//!
//! Rules 3 and 4 need something to compare. A message with no keywords and
//! no themes skips them and lands on rule 5.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tangent_core::errors::StateTransitionError;
use tangent_core::ids::{OwnerId, ThreadId, TransitionId};
use tangent_core::thread::{PreservedContext, Thread, ThreadState, Transition};
use tangent_signals::heuristics::{
    estimate_engagement, estimate_time_sensitivity, extract_open_questions,
    extract_pending_actions, has_resolution_cue,
};
use tangent_signals::{EmotionalSignal, MessageSignals, SimilarityScorer, TransitionClassifier};
use tracing::{debug, info, warn};

use crate::config::RoutingConfig;
use crate::guidance::{BRIDGE_KEYWORDS, compose_bridge};
use crate::priority::PriorityScorer;
use crate::providers::RelationshipContext;
use crate::store::ThreadStore;

const ENGAGEMENT_MEMORY: f64 = 0.7;
const URGENCY_MEMORY: f64 = 0.5;
const TIME_SENSITIVITY_DECAY: f64 = 0.8;
const RESOLUTION_STEP: f64 = 0.5;

/// Which resolution rule picked the target thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteRule {
    /// The message named an existing thread's keywords.
    ExplicitReference,
    /// Strong transition cues opened a new thread.
    StrongTransition,
    /// A recent, similar live thread was continued.
    SimilarContinuation,
    /// The focused thread was too dissimilar; a new thread was opened.
    Divergence,
    /// The focused thread was continued.
    ContinueCurrent,
    /// No focused thread existed; a new thread was opened.
    NoActiveThread,
    /// The focused thread had been retired; a new thread was opened.
    StateConflict,
}

/// Benign anomalies noticed while routing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum RoutingEvent {
    /// The active pointer referenced a thread that is no longer live, or a
    /// planned state change was refused. Routing re-resolved without it.
    StateConflict {
        /// Thread involved.
        thread_id: ThreadId,
        /// Its state at detection time, if it still exists.
        state: Option<ThreadState>,
    },
}

/// Per-message inputs resolved before planning.
#[derive(Clone, Debug)]
pub struct MessageInput<'a> {
    /// Raw message text.
    pub text: &'a str,
    /// Extracted lexical signals.
    pub signals: MessageSignals,
    /// Emotional reading from the provider or the local fallback.
    pub emotion: EmotionalSignal,
    /// Relationship context for priority scoring.
    pub relationship: RelationshipContext,
}

/// Everything one routed message will change, computed but not yet applied.
#[derive(Clone, Debug)]
pub struct RoutePlan {
    /// Rule that picked the target.
    pub rule: RouteRule,
    /// Final state of the target thread.
    pub target: Thread,
    /// Whether `target` is new.
    pub created: bool,
    /// Final state of the thread losing focus, if any.
    pub outgoing: Option<Thread>,
    /// Transition to record, if the focus moves.
    pub transition: Option<Transition>,
    /// Best similarity computed against a live thread.
    pub best_similarity: Option<f64>,
    /// Anomalies noticed while planning.
    pub events: Vec<RoutingEvent>,
}

enum Resolution<'s> {
    Existing(&'s Thread),
    New,
}

/// Resolves which thread a message belongs to.
#[derive(Clone, Debug)]
pub struct ThreadRouter {
    config: RoutingConfig,
}

impl ThreadRouter {
    /// Create a router with the given thresholds.
    pub fn new(config: RoutingConfig) -> Self {
        Self { config }
    }

    /// Decide where the message goes and how every touched thread changes.
    pub fn plan<S: ThreadStore + ?Sized>(
        &self,
        store: &S,
        owner_id: &OwnerId,
        input: &MessageInput<'_>,
        now: DateTime<Utc>,
    ) -> RoutePlan {
        let mut events = Vec::new();
        let focused = focused_thread(store, &mut events);
        let (resolution, rule, best_similarity) = self.resolve(store, focused, input, now, &events);

        debug!(
            owner_id = %owner_id,
            rule = ?rule,
            cue_strength = input.signals.cues.strength,
            best_similarity = ?best_similarity,
            "route resolved"
        );

        match build(store, owner_id, focused, resolution, input, now) {
            Ok((target, created, outgoing, transition)) => RoutePlan {
                rule,
                target,
                created,
                outgoing,
                transition,
                best_similarity,
                events,
            },
            Err(StateTransitionError::Illegal { thread_id, from, to }) => {
                warn!(
                    owner_id = %owner_id,
                    thread_id = %thread_id,
                    from = %from,
                    to = %to,
                    "planned state change refused, opening a fresh thread"
                );
                events.push(RoutingEvent::StateConflict {
                    thread_id,
                    state: Some(from),
                });
                RoutePlan {
                    rule: RouteRule::StateConflict,
                    target: open_thread(store, owner_id, input, now),
                    created: true,
                    outgoing: None,
                    transition: None,
                    best_similarity,
                    events,
                }
            }
        }
    }

    /// Apply a plan. Cannot fail.
    pub fn commit<S: ThreadStore + ?Sized>(store: &mut S, plan: &RoutePlan) {
        if let Some(outgoing) = &plan.outgoing {
            store.upsert(outgoing.clone());
        }
        store.upsert(plan.target.clone());
        if let Some(transition) = &plan.transition {
            store.append_transition(transition.clone());
        }
        store.set_active_thread_id(Some(plan.target.thread_id.clone()));
        if plan.created {
            store.advance_sequence();
        }
    }

    fn resolve<'s, S: ThreadStore + ?Sized>(
        &self,
        store: &'s S,
        focused: Option<&'s Thread>,
        input: &MessageInput<'_>,
        now: DateTime<Utc>,
        events: &[RoutingEvent],
    ) -> (Resolution<'s>, RouteRule, Option<f64>) {
        let signals = &input.signals;

        if let Some(thread) = self.explicit_reference(store, signals) {
            return (Resolution::Existing(thread), RouteRule::ExplicitReference, None);
        }

        if signals.cues.strength > self.config.strong_transition_threshold {
            return (Resolution::New, RouteRule::StrongTransition, None);
        }

        let has_content = !signals.keywords.is_empty() || !signals.themes.is_empty();
        let mut best_similarity = None;
        if has_content {
            let best = store
                .list()
                .into_iter()
                .filter(|t| t.is_live())
                .map(|t| (SimilarityScorer::score(signals, t), t))
                .max_by(|(sa, a), (sb, b)| {
                    sa.total_cmp(sb).then_with(|| b.thread_id.cmp(&a.thread_id))
                });
            if let Some((score, thread)) = best {
                best_similarity = Some(score);
                let recent =
                    now.signed_duration_since(thread.last_active) <= self.config.continue_window;
                if score > self.config.continue_similarity_threshold && recent {
                    return (
                        Resolution::Existing(thread),
                        RouteRule::SimilarContinuation,
                        best_similarity,
                    );
                }
            }

            if let Some(current) = focused {
                let score = SimilarityScorer::score(signals, current);
                if score < self.config.diverge_similarity_threshold {
                    return (Resolution::New, RouteRule::Divergence, best_similarity);
                }
            }
        }

        match focused {
            Some(current) => (
                Resolution::Existing(current),
                RouteRule::ContinueCurrent,
                best_similarity,
            ),
            None if events.is_empty() => (Resolution::New, RouteRule::NoActiveThread, best_similarity),
            None => (Resolution::New, RouteRule::StateConflict, best_similarity),
        }
    }

    /// Live or background thread whose leading keywords the message names.
    fn explicit_reference<'s, S: ThreadStore + ?Sized>(
        &self,
        store: &'s S,
        signals: &MessageSignals,
    ) -> Option<&'s Thread> {
        let words: HashSet<&str> = signals.keywords.iter().map(String::as_str).collect();
        if words.is_empty() {
            return None;
        }
        store
            .list()
            .into_iter()
            .filter(|t| t.is_live() || t.state == ThreadState::Background)
            .filter_map(|t| {
                let top = t.top_keywords(self.config.explicit_reference_top_k);
                if top.is_empty() {
                    return None;
                }
                let needed = self.config.explicit_reference_min_matches.min(top.len());
                let hits = top.iter().filter(|k| words.contains(k.as_str())).count();
                (hits >= needed).then_some((hits, t))
            })
            .max_by(|(ha, a), (hb, b)| {
                ha.cmp(hb)
                    .then_with(|| a.last_active.cmp(&b.last_active))
                    .then_with(|| b.thread_id.cmp(&a.thread_id))
            })
            .map(|(_, t)| t)
    }
}

/// Final states of the target and outgoing threads, and the transition between them.
#[allow(clippy::type_complexity)]
fn build<S: ThreadStore + ?Sized>(
    store: &S,
    owner_id: &OwnerId,
    focused: Option<&Thread>,
    resolution: Resolution<'_>,
    input: &MessageInput<'_>,
    now: DateTime<Utc>,
) -> Result<(Thread, bool, Option<Thread>, Option<Transition>), StateTransitionError> {
    let (mut target, created) = match resolution {
        Resolution::Existing(thread) => {
            let mut thread = thread.clone();
            thread.transition_to(ThreadState::Active)?;
            continue_thread(&mut thread, input, now);
            (thread, false)
        }
        Resolution::New => (open_thread(store, owner_id, input, now), true),
    };

    let Some(previous) = focused.filter(|f| f.thread_id != target.thread_id) else {
        return Ok((target, created, None, None));
    };

    let transition_type = TransitionClassifier::classify(
        &input.signals.cues,
        input.emotion.urgency_estimate,
    );
    let bridge_text = compose_bridge(
        transition_type,
        previous.top_keywords(BRIDGE_KEYWORDS),
        target.top_keywords(BRIDGE_KEYWORDS),
    );

    let mut outgoing = previous.clone();
    outgoing.transition_to(ThreadState::Paused)?;
    outgoing.pause_reason = Some(format!("transitioned to {}", target.thread_id));
    outgoing.relate_to(&target.thread_id);
    target.relate_to(&outgoing.thread_id);

    let transition = Transition {
        transition_id: TransitionId::new(),
        owner_id: owner_id.clone(),
        from_thread_id: Some(previous.thread_id.clone()),
        to_thread_id: target.thread_id.clone(),
        transition_type,
        trigger_text: input.text.to_owned(),
        bridge_text,
        preserved_context: PreservedContext::capture(previous),
        occurred_at: now,
    };

    info!(
        owner_id = %owner_id,
        from = %previous.thread_id,
        to = %target.thread_id,
        transition_type = %transition_type,
        "focus moved"
    );

    Ok((target, created, Some(outgoing), Some(transition)))
}

/// A new thread seeded from the message.
fn open_thread<S: ThreadStore + ?Sized>(
    store: &S,
    owner_id: &OwnerId,
    input: &MessageInput<'_>,
    now: DateTime<Utc>,
) -> Thread {
    let thread_id = ThreadId::derive(owner_id, now, store.sequence());
    let mut thread = Thread::new(
        thread_id,
        owner_id.clone(),
        input.signals.keywords.clone(),
        input.signals.themes.iter().cloned(),
        now,
    );
    thread.emotional_urgency = input.emotion.urgency_estimate;
    thread.time_sensitivity = estimate_time_sensitivity(input.text);
    thread.engagement_level = estimate_engagement(input.text, input.emotion.intensity);
    absorb_content(&mut thread, input, now);
    thread.priority_level = PriorityScorer::initial_level(
        thread.emotional_urgency,
        thread.time_sensitivity,
        thread.engagement_level,
    );
    info!(
        owner_id = %owner_id,
        thread_id = %thread.thread_id,
        keywords = ?thread.topic_seed_keywords,
        "thread created"
    );
    thread
}

/// The thread the active pointer names, if it is still live.
fn focused_thread<'s, S: ThreadStore + ?Sized>(
    store: &'s S,
    events: &mut Vec<RoutingEvent>,
) -> Option<&'s Thread> {
    let id = store.active_thread_id()?;
    match store.get(id) {
        Some(thread) if thread.is_live() => Some(thread),
        other => {
            let state = other.map(|t| t.state);
            warn!(
                thread_id = %id,
                state = ?state,
                "active thread is no longer live, re-routing"
            );
            events.push(RoutingEvent::StateConflict {
                thread_id: id.clone(),
                state,
            });
            None
        }
    }
}

/// Fold a message into an existing thread.
fn continue_thread(thread: &mut Thread, input: &MessageInput<'_>, now: DateTime<Utc>) {
    thread.merge_keywords(&input.signals.keywords);
    thread.merge_themes(&input.signals.themes);

    let engagement = estimate_engagement(input.text, input.emotion.intensity);
    thread.engagement_level =
        ENGAGEMENT_MEMORY * thread.engagement_level + (1.0 - ENGAGEMENT_MEMORY) * engagement;
    thread.emotional_urgency = URGENCY_MEMORY * thread.emotional_urgency
        + (1.0 - URGENCY_MEMORY) * input.emotion.urgency_estimate;
    thread.time_sensitivity = f64::max(
        TIME_SENSITIVITY_DECAY * thread.time_sensitivity,
        estimate_time_sensitivity(input.text),
    );

    absorb_content(thread, input, now);
    thread.priority_level = PriorityScorer::report(thread, &input.relationship).level;
}

/// Message bookkeeping shared by new and continued threads.
fn absorb_content(thread: &mut Thread, input: &MessageInput<'_>, now: DateTime<Utc>) {
    thread.record_message(now);
    if has_resolution_cue(input.text) {
        thread.completion_status = (thread.completion_status + RESOLUTION_STEP).min(1.0);
        thread.unresolved_questions.clear();
    }
    thread.track_questions(&extract_open_questions(input.text));
    thread.track_actions(&extract_pending_actions(input.text));
    thread.last_emotion = Some(input.emotion.primary_emotion.clone());
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
