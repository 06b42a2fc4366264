//! Runtime configuration derived from [`TangentSettings`].
//!
//! Settings are plain serializable numbers; these types convert them once
//! into the durations and thresholds the router works with.

use std::time::Duration as StdDuration;

use chrono::Duration;
use tangent_settings::TangentSettings;

/// Thresholds for the thread-resolution rules.
#[derive(Clone, Debug)]
pub struct RoutingConfig {
    /// Leading keywords of a thread checked for explicit references.
    pub explicit_reference_top_k: usize,
    /// Keyword hits needed for an explicit reference.
    pub explicit_reference_min_matches: usize,
    /// Cue strength above which a message opens a new thread.
    pub strong_transition_threshold: f64,
    /// Similarity above which a recent thread is continued.
    pub continue_similarity_threshold: f64,
    /// Recency window for similarity continuation.
    pub continue_window: Duration,
    /// Similarity below which the focused thread is abandoned.
    pub diverge_similarity_threshold: f64,
}

/// Capacity limits enforced by reconciliation.
#[derive(Clone, Debug)]
pub struct CapacityConfig {
    /// Maximum live threads per owner.
    pub max_active_threads: usize,
    /// Maximum background threads per owner.
    pub max_background_threads: usize,
    /// Inactivity after which a thread is archived.
    pub thread_timeout: Duration,
}

/// Transition retention and result-bundle sizes.
#[derive(Clone, Debug)]
pub struct HistoryConfig {
    /// How long transitions are retained.
    pub transition_window: Duration,
    /// Hard cap on retained transitions per owner.
    pub max_transitions: usize,
    /// Transitions included in each result bundle.
    pub recent_transitions_limit: usize,
    /// Threads included in each result bundle's summary list.
    pub active_summary_limit: usize,
}

/// Everything the [`ConversationRouter`](crate::ConversationRouter) needs.
#[derive(Clone, Debug)]
pub struct RouterConfig {
    /// Routing thresholds.
    pub routing: RoutingConfig,
    /// Capacity limits.
    pub capacity: CapacityConfig,
    /// History retention.
    pub history: HistoryConfig,
    /// Bound on the emotional-signal provider call.
    pub emotion_timeout: StdDuration,
    /// Idempotency keys remembered per owner; 0 disables replay detection.
    pub idempotency_cache_size: usize,
    /// Reconcile capacity after every routed message.
    pub reconcile_after_route: bool,
}

fn secs(value: u64) -> Duration {
    i64::try_from(value)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

impl From<&TangentSettings> for RouterConfig {
    fn from(settings: &TangentSettings) -> Self {
        let routing = &settings.routing;
        let capacity = &settings.capacity;
        let history = &settings.history;
        Self {
            routing: RoutingConfig {
                explicit_reference_top_k: routing.explicit_reference_top_k,
                explicit_reference_min_matches: routing.explicit_reference_min_matches,
                strong_transition_threshold: routing.strong_transition_threshold,
                continue_similarity_threshold: routing.continue_similarity_threshold,
                continue_window: secs(routing.continue_window_secs),
                diverge_similarity_threshold: routing.diverge_similarity_threshold,
            },
            capacity: CapacityConfig::from(settings),
            history: HistoryConfig {
                transition_window: secs(history.transition_window_secs),
                max_transitions: history.max_transitions,
                recent_transitions_limit: history.recent_transitions_limit,
                active_summary_limit: history.active_summary_limit,
            },
            emotion_timeout: StdDuration::from_millis(settings.providers.emotion_timeout_ms),
            idempotency_cache_size: routing.idempotency_cache_size,
            reconcile_after_route: capacity.reconcile_after_route,
        }
    }
}

impl From<&TangentSettings> for CapacityConfig {
    fn from(settings: &TangentSettings) -> Self {
        let capacity = &settings.capacity;
        Self {
            max_active_threads: capacity.max_active_threads,
            max_background_threads: capacity.max_background_threads,
            thread_timeout: secs(capacity.thread_timeout_secs),
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::from(&TangentSettings::default())
    }
}

impl Default for CapacityConfig {
    fn default() -> Self {
        RouterConfig::default().capacity
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        RouterConfig::default().history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_settings() {
        let config = RouterConfig::default();
        assert_eq!(config.capacity.max_active_threads, 5);
        assert_eq!(config.capacity.max_background_threads, 20);
        assert_eq!(config.capacity.thread_timeout, Duration::hours(48));
        assert_eq!(config.routing.continue_window, Duration::hours(2));
        assert_eq!(config.history.transition_window, Duration::hours(24));
        assert_eq!(config.emotion_timeout, StdDuration::from_millis(250));
        assert_eq!(config.idempotency_cache_size, 256);
        assert!(config.reconcile_after_route);
    }

    #[test]
    fn settings_overrides_carry_through() {
        let mut settings = TangentSettings::default();
        settings.capacity.max_active_threads = 2;
        settings.routing.continue_window_secs = 60;
        let config = RouterConfig::from(&settings);
        assert_eq!(config.capacity.max_active_threads, 2);
        assert_eq!(config.routing.continue_window, Duration::seconds(60));
    }
}
