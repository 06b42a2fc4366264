//! The routing facade.
//!
//! [`ConversationRouter`] owns one slot per owner: the owner's
//! thread store and replay cache behind a mutex. Every read and write for an
//! owner happens under that mutex, so routing and reconciliation never
//! interleave for the same owner, while different owners proceed in
//! parallel.
//!
//! The only suspension point is the emotional-signal provider. It runs
//! before the owner's mutex is taken; planning, commit and the result bundle
//! are synchronous under the lock. A caller that drops the future before it
//! completes has changed nothing.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use tangent_core::clock::{Clock, SystemClock};
use tangent_core::ids::{OwnerId, ThreadId};
use tangent_core::thread::{Thread, Transition};
use tangent_signals::{EmotionalSignal, LexicalSignalExtractor, TextSignalExtractor};
use tracing::{debug, instrument, warn};

use crate::capacity::{CapacityManager, ReconcileReport, by_engagement_then_recency};
use crate::config::RouterConfig;
use crate::guidance::ResponseGuidance;
use crate::priority::PriorityScorer;
use crate::providers::{
    EmotionalSignalProvider, RelationshipContext, RelationshipProvider, resolve_emotion,
    resolve_relationship,
};
use crate::replay::{ReplayCache, replay_key};
use crate::result::{ResultBundle, RouteDiagnostics, ThreadAnalysis, ThreadSummary};
use crate::router::{MessageInput, RoutePlan, ThreadRouter};
use crate::store::{InMemoryThreadStore, ThreadStore};

/// Per-call context supplied by the caller.
#[derive(Clone, Debug, Default)]
pub struct RouteContext {
    /// Emotional reading computed upstream. Skips the provider when well formed.
    pub emotional_state: Option<EmotionalSignal>,
    /// Relationship context computed upstream. Skips the provider.
    pub relationship: Option<RelationshipContext>,
    /// Caller-assigned id making re-deliveries idempotent.
    pub request_id: Option<String>,
}

impl RouteContext {
    /// Context carrying only a request id.
    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: Some(request_id.into()),
            ..Self::default()
        }
    }
}

/// Everything kept for one owner.
#[derive(Debug)]
struct OwnerSlot {
    store: InMemoryThreadStore,
    replay: ReplayCache<ResultBundle>,
}

/// Routes messages into threads for any number of owners.
pub struct ConversationRouter {
    config: RouterConfig,
    router: ThreadRouter,
    capacity: CapacityManager,
    extractor: Arc<dyn TextSignalExtractor>,
    clock: Arc<dyn Clock>,
    emotions: Option<Arc<dyn EmotionalSignalProvider>>,
    relationships: Option<Arc<dyn RelationshipProvider>>,
    owners: DashMap<OwnerId, Arc<Mutex<OwnerSlot>>>,
}

impl ConversationRouter {
    /// Create a router with the lexical extractor, the system clock and no
    /// collaborator providers.
    pub fn new(config: RouterConfig) -> Self {
        Self {
            router: ThreadRouter::new(config.routing.clone()),
            capacity: CapacityManager::new(config.capacity.clone()),
            config,
            extractor: Arc::new(LexicalSignalExtractor::new()),
            clock: Arc::new(SystemClock),
            emotions: None,
            relationships: None,
            owners: DashMap::new(),
        }
    }

    /// Read time from `clock`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Extract signals with `extractor`.
    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn TextSignalExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Ask `provider` for emotional readings.
    #[must_use]
    pub fn with_emotion_provider(mut self, provider: Arc<dyn EmotionalSignalProvider>) -> Self {
        self.emotions = Some(provider);
        self
    }

    /// Ask `provider` for relationship context.
    #[must_use]
    pub fn with_relationship_provider(mut self, provider: Arc<dyn RelationshipProvider>) -> Self {
        self.relationships = Some(provider);
        self
    }

    /// The configuration in force.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Route one message and report what happened.
    ///
    /// Never fails. Provider trouble falls back to local heuristics, and a
    /// stale focus pointer falls back to a fresh thread.
    #[instrument(skip_all, fields(owner_id = %owner_id))]
    pub async fn route_message(
        &self,
        owner_id: &OwnerId,
        text: &str,
        ctx: RouteContext,
    ) -> ResultBundle {
        let slot = self.slot(owner_id);
        let key = ctx
            .request_id
            .as_deref()
            .map(|request_id| replay_key(owner_id, text, request_id));

        if let Some(hit) = key.as_deref().and_then(|k| slot.lock().replay.get(k)) {
            debug!("re-delivered message, serving remembered result");
            return replayed(hit);
        }

        let emotion = match ctx.emotional_state {
            Some(signal) if signal.is_well_formed() => signal,
            supplied => {
                if supplied.is_some() {
                    warn!("supplied emotional state out of range, ignoring it");
                }
                resolve_emotion(
                    self.emotions.as_deref(),
                    owner_id,
                    text,
                    self.config.emotion_timeout,
                )
                .await
            }
        };
        let relationship = ctx.relationship.map_or_else(
            || resolve_relationship(self.relationships.as_deref(), owner_id),
            RelationshipContext::sanitized,
        );

        let input = MessageInput {
            text,
            signals: self.extractor.signals(text),
            emotion,
            relationship,
        };
        self.route_locked(&slot, owner_id, &input, key)
    }

    /// Live threads of `owner_id`, by engagement and recency.
    pub fn list_active_threads(&self, owner_id: &OwnerId) -> Vec<ThreadSummary> {
        self.with_store(owner_id, |store| {
            live_threads(store)
                .into_iter()
                .map(ThreadSummary::from)
                .collect()
        })
        .unwrap_or_default()
    }

    /// Transitions of `owner_id` within `window` of now, newest first.
    pub fn recent_transitions(&self, owner_id: &OwnerId, window: Duration) -> Vec<Transition> {
        let now = self.clock.now();
        self.with_store(owner_id, |store| {
            store
                .transitions_since(window_start(now, window))
                .into_iter()
                .cloned()
                .collect()
        })
        .unwrap_or_default()
    }

    /// Enforce capacity limits and the inactivity timeout for `owner_id`.
    #[instrument(skip_all, fields(owner_id = %owner_id))]
    pub fn reconcile(&self, owner_id: &OwnerId) -> ReconcileReport {
        let Some(slot) = self.existing_slot(owner_id) else {
            return ReconcileReport::default();
        };
        let now = self.clock.now();
        let mut slot = slot.lock();
        self.capacity.reconcile(&mut slot.store, now)
    }

    /// Reconcile every known owner. Owners whose pass changed nothing are left out.
    pub fn reconcile_all(&self) -> BTreeMap<OwnerId, ReconcileReport> {
        self.known_owners()
            .into_iter()
            .map(|owner_id| {
                let report = self.reconcile(&owner_id);
                (owner_id, report)
            })
            .filter(|(_, report)| !report.is_empty())
            .collect()
    }

    /// Every thread of `owner_id`, in any state, by id.
    pub fn threads(&self, owner_id: &OwnerId) -> Vec<Thread> {
        self.with_store(owner_id, |store| store.list().into_iter().cloned().collect())
            .unwrap_or_default()
    }

    /// The thread `owner_id` is focused on, if any.
    pub fn active_thread_id(&self, owner_id: &OwnerId) -> Option<ThreadId> {
        self.with_store(owner_id, |store| store.active_thread_id().cloned())
            .flatten()
    }

    /// Owners with state, sorted.
    pub fn known_owners(&self) -> Vec<OwnerId> {
        let mut owners: Vec<OwnerId> = self.owners.iter().map(|e| e.key().clone()).collect();
        owners.sort();
        owners
    }

    fn slot(&self, owner_id: &OwnerId) -> Arc<Mutex<OwnerSlot>> {
        if let Some(slot) = self.existing_slot(owner_id) {
            return slot;
        }
        self.owners
            .entry(owner_id.clone())
            .or_insert_with(|| {
                Arc::new(Mutex::new(OwnerSlot {
                    store: InMemoryThreadStore::new(self.config.history.clone()),
                    replay: ReplayCache::new(self.config.idempotency_cache_size),
                }))
            })
            .value()
            .clone()
    }

    fn existing_slot(&self, owner_id: &OwnerId) -> Option<Arc<Mutex<OwnerSlot>>> {
        self.owners.get(owner_id).map(|slot| slot.value().clone())
    }

    fn with_store<T>(
        &self,
        owner_id: &OwnerId,
        f: impl FnOnce(&InMemoryThreadStore) -> T,
    ) -> Option<T> {
        let slot = self.existing_slot(owner_id)?;
        let slot = slot.lock();
        Some(f(&slot.store))
    }

    fn route_locked(
        &self,
        slot: &Mutex<OwnerSlot>,
        owner_id: &OwnerId,
        input: &MessageInput<'_>,
        key: Option<String>,
    ) -> ResultBundle {
        let mut guard = slot.lock();
        let OwnerSlot { store, replay } = &mut *guard;

        if let Some(hit) = key.as_deref().and_then(|k| replay.get(k)) {
            return replayed(hit);
        }

        let now = self.clock.now();
        let plan = self.router.plan(&*store, owner_id, input, now);
        ThreadRouter::commit(store, &plan);
        let reconciled = self
            .config
            .reconcile_after_route
            .then(|| self.capacity.reconcile(store, now));

        let bundle = self.bundle(store, owner_id, &plan, input, reconciled, now);
        if let Some(key) = key {
            replay.insert(key, bundle.clone());
        }
        bundle
    }

    fn bundle(
        &self,
        store: &InMemoryThreadStore,
        owner_id: &OwnerId,
        plan: &RoutePlan,
        input: &MessageInput<'_>,
        reconcile: Option<ReconcileReport>,
        now: DateTime<Utc>,
    ) -> ResultBundle {
        let history = &self.config.history;
        let target = store.get(&plan.target.thread_id).unwrap_or(&plan.target);
        let live = live_threads(store);

        ResultBundle {
            owner_id: owner_id.clone(),
            current_thread_id: target.thread_id.clone(),
            analysis: ThreadAnalysis::of(target, plan.created),
            transition: plan.transition.clone(),
            priorities: live
                .iter()
                .map(|t| {
                    (
                        t.thread_id.clone(),
                        PriorityScorer::report(t, &input.relationship),
                    )
                })
                .collect(),
            active_threads: live
                .iter()
                .take(history.active_summary_limit)
                .map(|t| ThreadSummary::from(*t))
                .collect(),
            recent_transitions: store
                .transitions_since(window_start(now, history.transition_window))
                .into_iter()
                .take(history.recent_transitions_limit)
                .cloned()
                .collect(),
            guidance: ResponseGuidance::build(
                plan.transition.as_ref(),
                input.emotion.urgency_estimate,
                &input.relationship,
            ),
            diagnostics: RouteDiagnostics {
                rule: plan.rule,
                cue_strength: input.signals.cues.strength,
                best_similarity: plan.best_similarity,
                state_conflicts: plan.events.len(),
                reconcile,
            },
            replayed: false,
        }
    }
}

fn replayed(mut bundle: ResultBundle) -> ResultBundle {
    bundle.replayed = true;
    bundle
}

fn live_threads(store: &InMemoryThreadStore) -> Vec<&Thread> {
    let mut live: Vec<&Thread> = store.list().into_iter().filter(|t| t.is_live()).collect();
    live.sort_by(|a, b| by_engagement_then_recency(a, b));
    live
}

fn window_start(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::RouteRule;
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use tangent_core::clock::ManualClock;
    use tangent_core::thread::ThreadState;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn fixture() -> (ConversationRouter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(t0()));
        let router = ConversationRouter::new(RouterConfig::default()).with_clock(clock.clone());
        (router, clock)
    }

    #[tokio::test]
    async fn first_message_builds_bundle() {
        let (router, _) = fixture();
        let alice = OwnerId::from("alice");
        let bundle = router
            .route_message(&alice, "I'll have a whiskey", RouteContext::default())
            .await;

        assert!(bundle.analysis.created);
        assert_eq!(bundle.analysis.keywords, vec!["whiskey"]);
        assert_eq!(bundle.active_threads.len(), 1);
        assert_eq!(bundle.priorities.len(), 1);
        assert!(bundle.transition.is_none());
        assert!(!bundle.guidance.acknowledge_transition);
        assert_matches!(bundle.diagnostics.rule, RouteRule::NoActiveThread);
        assert!(!bundle.replayed);
        assert_eq!(router.active_thread_id(&alice), Some(bundle.current_thread_id));
    }

    #[tokio::test]
    async fn owners_are_isolated() {
        let (router, _) = fixture();
        let alice = OwnerId::from("alice");
        let bob = OwnerId::from("bob");
        let _ = router
            .route_message(&alice, "The garden roses need pruning", RouteContext::default())
            .await;

        assert_eq!(router.threads(&alice).len(), 1);
        assert!(router.threads(&bob).is_empty());
        assert!(router.list_active_threads(&bob).is_empty());
        assert!(router.reconcile(&bob).is_empty());
        assert_eq!(router.known_owners(), vec![alice]);
    }

    #[tokio::test]
    async fn request_id_makes_redelivery_idempotent() {
        let (router, clock) = fixture();
        let alice = OwnerId::from("alice");
        let first = router
            .route_message(&alice, "The garden roses need pruning", RouteContext::default())
            .await;
        clock.advance(Duration::minutes(1));

        let ctx = RouteContext::with_request_id("req-1");
        let second = router
            .route_message(&alice, "garden roses again", ctx.clone())
            .await;
        let again = router.route_message(&alice, "garden roses again", ctx).await;

        assert_eq!(second.current_thread_id, first.current_thread_id);
        assert_eq!(second.analysis.message_count, 2);
        assert!(again.replayed);
        assert_eq!(again.analysis.message_count, 2);
        assert_eq!(router.threads(&alice)[0].message_count, 2);
    }

    #[tokio::test]
    async fn supplied_context_overrides_providers() {
        let (router, _) = fixture();
        let alice = OwnerId::from("alice");
        let ctx = RouteContext {
            emotional_state: Some(EmotionalSignal {
                primary_emotion: "anxious".into(),
                intensity: 0.9,
                urgency_estimate: 0.9,
            }),
            relationship: Some(RelationshipContext {
                relationship_depth: 0.9,
                trust_level: 0.9,
            }),
            request_id: None,
        };
        let bundle = router.route_message(&alice, "The rent is late", ctx).await;
        let thread = &router.threads(&alice)[0];
        assert!((thread.emotional_urgency - 0.9).abs() < f64::EPSILON);
        assert_eq!(thread.last_emotion.as_deref(), Some("anxious"));
        assert_eq!(bundle.guidance.tone, crate::guidance::Tone::Gentle);
    }

    #[tokio::test]
    async fn recent_transitions_respect_window() {
        let (router, clock) = fixture();
        let alice = OwnerId::from("alice");
        let _ = router
            .route_message(&alice, "The garden roses need pruning", RouteContext::default())
            .await;
        clock.advance(Duration::minutes(1));
        let bundle = router
            .route_message(
                &alice,
                "Anyway, the budget spreadsheet is broken",
                RouteContext::default(),
            )
            .await;
        assert_eq!(bundle.recent_transitions.len(), 1);

        clock.advance(Duration::hours(2));
        assert_eq!(router.recent_transitions(&alice, Duration::hours(3)).len(), 1);
        assert!(router.recent_transitions(&alice, Duration::hours(1)).is_empty());
        assert_eq!(router.recent_transitions(&alice, Duration::MAX).len(), 1);
    }

    #[tokio::test]
    async fn reconcile_all_reports_only_changed_owners() {
        let (router, clock) = fixture();
        let alice = OwnerId::from("alice");
        let bob = OwnerId::from("bob");
        let _ = router
            .route_message(&alice, "The garden roses need pruning", RouteContext::default())
            .await;
        clock.advance(Duration::hours(49));
        let _ = router
            .route_message(&bob, "Quarterly taxes confuse accountants", RouteContext::default())
            .await;

        let reports = router.reconcile_all();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[&alice].archived_expired.len(), 1);
        assert_eq!(router.threads(&alice)[0].state, ThreadState::Archived);
    }
}
