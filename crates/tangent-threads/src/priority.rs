//! Multi-factor priority scoring.
//!
//! ```text
//! score = clip01(0.30 · emotional_urgency
//!              + 0.25 · time_sensitivity
//!              + 0.20 · engagement_level
//!              + 0.15 · relationship_importance
//!              + 0.10 · (1 − completion_status))
//! ```
//!
//! A new thread has no history to score, so its first level comes from a
//! narrower blend of the message's own urgency, time sensitivity and
//! engagement (0.4 / 0.3 / 0.3).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tangent_core::thread::{PriorityLevel, Thread};
use tangent_signals::lexicon::HIGH_IMPORTANCE_THEMES;

use crate::providers::RelationshipContext;

const W_URGENCY: f64 = 0.30;
const W_TIME: f64 = 0.25;
const W_ENGAGEMENT: f64 = 0.20;
const W_RELATIONSHIP: f64 = 0.15;
const W_OPEN: f64 = 0.10;

const INITIAL_W_URGENCY: f64 = 0.4;
const INITIAL_W_TIME: f64 = 0.3;
const INITIAL_W_ENGAGEMENT: f64 = 0.3;

/// The five inputs of the priority score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityFactors {
    /// How emotionally pressing the thread is.
    pub emotional_urgency: f64,
    /// How time-bound the thread is.
    pub time_sensitivity: f64,
    /// How engaged the owner is.
    pub engagement_level: f64,
    /// How much the thread touches high-importance themes and the relationship.
    pub relationship_importance: f64,
    /// How close the thread is to being wrapped up.
    pub completion_status: f64,
}

/// Score, bucket, and the factors behind them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityReport {
    /// Weighted score in `[0, 1]`.
    pub score: f64,
    /// Bucket of `score`.
    pub level: PriorityLevel,
    /// Contributing factors.
    pub factors: PriorityFactors,
}

/// Computes thread priority.
#[derive(Clone, Copy, Debug, Default)]
pub struct PriorityScorer;

impl PriorityScorer {
    /// Collect the factors of `thread`.
    pub fn factors(thread: &Thread, relationship: &RelationshipContext) -> PriorityFactors {
        PriorityFactors {
            emotional_urgency: thread.emotional_urgency,
            time_sensitivity: thread.time_sensitivity,
            engagement_level: thread.engagement_level,
            relationship_importance: Self::relationship_importance(&thread.theme_tags, relationship),
            completion_status: thread.completion_status,
        }
    }

    /// Weighted score of `factors`, clipped to `[0, 1]`.
    pub fn score(factors: &PriorityFactors) -> f64 {
        (W_URGENCY * factors.emotional_urgency
            + W_TIME * factors.time_sensitivity
            + W_ENGAGEMENT * factors.engagement_level
            + W_RELATIONSHIP * factors.relationship_importance
            + W_OPEN * (1.0 - factors.completion_status))
            .clamp(0.0, 1.0)
    }

    /// Score and bucket `thread`.
    pub fn report(thread: &Thread, relationship: &RelationshipContext) -> PriorityReport {
        let factors = Self::factors(thread, relationship);
        let score = Self::score(&factors);
        PriorityReport {
            score,
            level: PriorityLevel::from_score(score),
            factors,
        }
    }

    /// Level assigned to a thread when it is created.
    pub fn initial_level(urgency: f64, time_sensitivity: f64, engagement: f64) -> PriorityLevel {
        let score = (INITIAL_W_URGENCY * urgency
            + INITIAL_W_TIME * time_sensitivity
            + INITIAL_W_ENGAGEMENT * engagement)
            .clamp(0.0, 1.0);
        PriorityLevel::from_score(score)
    }

    /// `clip01(0.6 · theme_factor + 0.4 · relationship_factor)`.
    ///
    /// Each high-importance theme the thread carries adds 0.5 to the theme
    /// factor (capped at 1). The relationship factor is the mean of depth
    /// and trust.
    #[allow(clippy::cast_precision_loss)]
    pub fn relationship_importance(
        themes: &BTreeSet<String>,
        relationship: &RelationshipContext,
    ) -> f64 {
        let overlap = HIGH_IMPORTANCE_THEMES
            .iter()
            .filter(|theme| themes.contains(**theme))
            .count();
        let theme_factor = (0.5 * overlap as f64).min(1.0);
        let relationship_factor =
            (relationship.relationship_depth + relationship.trust_level) / 2.0;
        (0.6 * theme_factor + 0.4 * relationship_factor).clamp(0.0, 1.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
