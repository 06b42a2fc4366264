//! Routing thresholds.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Thresholds driving the thread-resolution rules.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoutingSettings {
    /// How many of a thread's leading keywords are checked for explicit references.
    pub explicit_reference_top_k: usize,
    /// Keyword hits needed for an explicit reference (capped by the thread's keyword count).
    pub explicit_reference_min_matches: usize,
    /// Cue strength above which a message always opens a new thread.
    pub strong_transition_threshold: f64,
    /// Similarity above which a recent thread is continued.
    pub continue_similarity_threshold: f64,
    /// Recency window for similarity continuation, in seconds.
    pub continue_window_secs: u64,
    /// Similarity below which the focused thread is abandoned.
    pub diverge_similarity_threshold: f64,
    /// Number of idempotency keys remembered per owner.
    pub idempotency_cache_size: usize,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            explicit_reference_top_k: 5,
            explicit_reference_min_matches: 2,
            strong_transition_threshold: 0.7,
            continue_similarity_threshold: 0.6,
            continue_window_secs: 2 * 3600,
            diverge_similarity_threshold: 0.3,
            idempotency_cache_size: 256,
        }
    }
}

impl RoutingSettings {
    pub(crate) fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("routing.strongTransitionThreshold", self.strong_transition_threshold),
            ("routing.continueSimilarityThreshold", self.continue_similarity_threshold),
            ("routing.divergeSimilarityThreshold", self.diverge_similarity_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SettingsError::invalid(
                    name,
                    format!("must be within [0, 1], got {value}"),
                ));
            }
        }
        if self.diverge_similarity_threshold > self.continue_similarity_threshold {
            return Err(SettingsError::invalid(
                "routing.divergeSimilarityThreshold",
                "must not exceed continueSimilarityThreshold",
            ));
        }
        if self.explicit_reference_min_matches == 0 {
            return Err(SettingsError::invalid(
                "routing.explicitReferenceMinMatches",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}
