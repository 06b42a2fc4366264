//! End-to-end routing scenarios against the public router API.

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tangent_core::clock::ManualClock;
use tangent_core::ids::OwnerId;
use tangent_core::logging::capture_logs;
use tangent_core::thread::{ThreadState, TransitionType};
use tangent_signals::EmotionalSignal;
use tangent_threads::{
    ConversationRouter, EmotionalSignalProvider, ProviderError, RouteContext, RouteRule,
    RouterConfig,
};
use tracing::Level;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

fn fixture(config: RouterConfig) -> (ConversationRouter, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0()));
    let router = ConversationRouter::new(config).with_clock(clock.clone());
    (router, clock)
}

fn owner() -> OwnerId {
    OwnerId::from("alice")
}

#[tokio::test]
async fn fresh_owner_gets_one_active_thread() {
    let (router, _) = fixture(RouterConfig::default());

    let bundle = router
        .route_message(&owner(), "I'll have a whiskey", RouteContext::default())
        .await;

    let threads = router.threads(&owner());
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].state, ThreadState::Active);
    assert!(threads[0].topic_seed_keywords.contains(&"whiskey".to_owned()));
    assert_eq!(bundle.current_thread_id, threads[0].thread_id);
}

#[tokio::test]
async fn explicit_switch_pauses_previous_thread() {
    let (router, clock) = fixture(RouterConfig::default());
    let first = router
        .route_message(
            &owner(),
            "Work stress, my boss, and the deadline",
            RouteContext::default(),
        )
        .await;
    let t1 = first.current_thread_id;
    assert_eq!(
        router.threads(&owner())[0].topic_keywords,
        vec!["work", "stress", "boss", "deadline"]
    );

    clock.advance(Duration::minutes(1));
    let bundle = router
        .route_message(
            &owner(),
            "Speaking of work, have you heard about the new AI project?",
            RouteContext::default(),
        )
        .await;

    let t2 = bundle.current_thread_id.clone();
    assert_ne!(t2, t1);
    assert!(bundle.analysis.created);
    let transition = bundle.transition.expect("switch is recorded");
    assert_eq!(transition.from_thread_id, Some(t1.clone()));
    assert_eq!(transition.to_thread_id, t2);
    assert_eq!(transition.transition_type, TransitionType::ExplicitSwitch);
    assert!(bundle.guidance.acknowledge_transition);

    let threads = router.threads(&owner());
    let previous = threads.iter().find(|t| t.thread_id == t1).unwrap();
    assert_eq!(previous.state, ThreadState::Paused);

    let history = router.recent_transitions(&owner(), Duration::hours(24));
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].transition_type, TransitionType::ExplicitSwitch);
}

#[tokio::test]
async fn sixth_topic_demotes_the_oldest_thread() {
    let mut config = RouterConfig::default();
    config.capacity.max_active_threads = 5;
    let (router, clock) = fixture(config);

    let topics = [
        "whiskey tasting notes smoky",
        "guitar chords practice daily",
        "doctor appointment blood pressure",
        "kitchen cabinets painted white",
        "bank loan interest rates",
        "robot vacuum cleaner broke",
    ];
    let mut ids = Vec::new();
    for text in topics {
        let bundle = router
            .route_message(&owner(), text, RouteContext::default())
            .await;
        assert!(bundle.analysis.created, "{text} should open a thread");
        ids.push(bundle.current_thread_id);
        clock.advance(Duration::minutes(1));
    }

    let threads = router.threads(&owner());
    let background: Vec<_> = threads
        .iter()
        .filter(|t| t.state == ThreadState::Background)
        .map(|t| t.thread_id.clone())
        .collect();
    assert_eq!(background, vec![ids[0].clone()]);

    let live = router.list_active_threads(&owner());
    assert_eq!(live.len(), 5);
    let mut live_ids: Vec<_> = live.iter().map(|s| s.thread_id.clone()).collect();
    live_ids.sort();
    let mut expected = ids[1..].to_vec();
    expected.sort();
    assert_eq!(live_ids, expected);
}

#[tokio::test]
async fn bundle_history_and_summaries_are_capped() {
    let (router, clock) = fixture(RouterConfig::default());
    let topics = [
        "whiskey tasting notes",
        "guitar chord practice",
        "kitchen cabinet paint",
        "bank loan rates",
        "robot vacuum repair",
        "pottery glaze recipes",
        "chess opening theory",
        "sourdough starter feeding",
        "marathon training plan",
        "telescope lens cleaning",
        "origami crane folding",
        "aquarium filter noise",
        "bicycle chain grease",
        "violin bow rosin",
    ];

    let mut last = None;
    for topic in topics {
        clock.advance(Duration::minutes(1));
        let bundle = router
            .route_message(&owner(), &format!("Anyway, {topic}"), RouteContext::default())
            .await;
        assert!(bundle.analysis.created, "{topic} should open a thread");
        last = Some(bundle);
    }
    let bundle = last.unwrap();

    assert_eq!(bundle.recent_transitions.len(), 10);
    assert!(
        bundle
            .recent_transitions
            .windows(2)
            .all(|w| w[0].occurred_at > w[1].occurred_at),
        "transitions must be newest first"
    );
    assert_eq!(
        bundle.recent_transitions[0].to_thread_id,
        bundle.current_thread_id
    );
    assert_eq!(bundle.active_threads.len(), 5);
    assert_eq!(bundle.priorities.len(), 5);
    assert!(bundle.priorities.contains_key(&bundle.current_thread_id));
}

#[tokio::test]
async fn idle_thread_is_archived_on_reconcile() {
    let (router, clock) = fixture(RouterConfig::default());
    let bundle = router
        .route_message(&owner(), "The garden roses need pruning", RouteContext::default())
        .await;

    clock.advance(Duration::hours(49));
    let report = router.reconcile(&owner());

    assert_eq!(report.archived_expired, vec![bundle.current_thread_id.clone()]);
    assert_eq!(router.threads(&owner())[0].state, ThreadState::Archived);
    assert!(router.list_active_threads(&owner()).is_empty());
}

#[tokio::test]
async fn thread_within_timeout_survives_reconcile() {
    let (router, clock) = fixture(RouterConfig::default());
    let _ = router
        .route_message(&owner(), "The garden roses need pruning", RouteContext::default())
        .await;

    clock.advance(Duration::hours(47));
    assert!(router.reconcile(&owner()).is_empty());
    assert_eq!(router.list_active_threads(&owner()).len(), 1);
}

#[tokio::test]
async fn archived_focus_reroutes_to_fresh_thread() {
    let (logs, _guard) = capture_logs();
    let (router, clock) = fixture(RouterConfig::default());
    let first = router
        .route_message(&owner(), "The garden roses need pruning", RouteContext::default())
        .await;
    clock.advance(Duration::hours(49));
    let _ = router.reconcile(&owner());
    assert_eq!(router.active_thread_id(&owner()), Some(first.current_thread_id.clone()));

    let bundle = router
        .route_message(&owner(), "garden roses again", RouteContext::default())
        .await;

    assert_ne!(bundle.current_thread_id, first.current_thread_id);
    assert!(bundle.analysis.created);
    assert!(bundle.transition.is_none());
    assert_matches!(bundle.diagnostics.rule, RouteRule::StateConflict);
    assert_eq!(bundle.diagnostics.state_conflicts, 1);

    let archived = router
        .threads(&owner())
        .into_iter()
        .find(|t| t.thread_id == first.current_thread_id)
        .unwrap();
    assert_eq!(archived.state, ThreadState::Archived);
    assert_eq!(archived.message_count, 1);
    assert!(logs.has_event(Level::WARN, "no longer live"));
    let conflict = logs.events_with_field("thread_id", &first.current_thread_id.to_string());
    assert!(conflict.iter().any(|e| e.level == Level::WARN));
}

#[tokio::test]
async fn redelivery_with_request_id_is_not_double_counted() {
    let (router, _) = fixture(RouterConfig::default());
    let ctx = RouteContext::with_request_id("msg-42");

    let first = router
        .route_message(&owner(), "I'll have a whiskey", ctx.clone())
        .await;
    let second = router
        .route_message(&owner(), "I'll have a whiskey", ctx)
        .await;

    assert!(!first.replayed);
    assert!(second.replayed);
    assert_eq!(second.current_thread_id, first.current_thread_id);
    let threads = router.threads(&owner());
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].message_count, 1);
}

#[tokio::test]
async fn repeated_text_without_request_id_is_routed_again() {
    let (router, _) = fixture(RouterConfig::default());
    let _ = router
        .route_message(&owner(), "I'll have a whiskey", RouteContext::default())
        .await;
    let again = router
        .route_message(&owner(), "I'll have a whiskey", RouteContext::default())
        .await;

    assert!(!again.replayed);
    assert_eq!(again.analysis.message_count, 2);
}

struct StalledProvider;

#[async_trait]
impl EmotionalSignalProvider for StalledProvider {
    async fn analyze(
        &self,
        _owner_id: &OwnerId,
        _text: &str,
    ) -> Result<EmotionalSignal, ProviderError> {
        std::future::pending().await
    }
}

#[tokio::test(start_paused = true)]
async fn stalled_provider_falls_back_to_local_urgency() {
    let (logs, _guard) = capture_logs();
    let (router, _) = fixture(RouterConfig::default());
    let router = router.with_emotion_provider(Arc::new(StalledProvider));

    let bundle = router
        .route_message(
            &owner(),
            "I'm so overwhelmed by this deadline",
            RouteContext::default(),
        )
        .await;

    let thread = &router.threads(&owner())[0];
    assert_eq!(thread.thread_id, bundle.current_thread_id);
    assert!((thread.emotional_urgency - 0.8).abs() < f64::EPSILON);
    assert_eq!(thread.last_emotion.as_deref(), Some("stressed"));
    assert!(logs.has_event(Level::WARN, "using local heuristic"));
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    const WORDS: &[&str] = &[
        "garden", "roses", "budget", "taxes", "guitar", "chords", "doctor", "kitchen", "whiskey",
        "robot", "anyway", "tomorrow", "deadline", "painting", "novel", "hiking",
    ];

    fn message() -> impl Strategy<Value = String> {
        proptest::collection::vec(proptest::sample::select(WORDS), 1..6)
            .prop_map(|words| words.join(" "))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn limits_hold_after_every_message(
            messages in proptest::collection::vec((message(), 0i64..240), 1..30),
        ) {
            let mut config = RouterConfig::default();
            config.capacity.max_active_threads = 3;
            config.capacity.max_background_threads = 2;
            let (router, clock) = fixture(config);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();

            for (text, gap_minutes) in messages {
                clock.advance(Duration::minutes(gap_minutes));
                let _ = runtime.block_on(router.route_message(&owner(), &text, RouteContext::default()));

                let threads = router.threads(&owner());
                let live = threads.iter().filter(|t| t.state.is_live()).count();
                let background = threads
                    .iter()
                    .filter(|t| t.state == ThreadState::Background)
                    .count();
                let active = threads.iter().filter(|t| t.state == ThreadState::Active).count();
                prop_assert!(live <= 3, "live {live}");
                prop_assert!(background <= 2, "background {background}");
                prop_assert!(active <= 1, "active {active}");
            }
        }
    }
}
