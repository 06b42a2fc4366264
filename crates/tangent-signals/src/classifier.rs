//! Transition classification.
//!
//! Rules are evaluated in order and the first match wins:
//!
//! 1. any explicit cue → [`TransitionType::ExplicitSwitch`]
//! 2. any reminder cue → [`TransitionType::ReminderDriven`]
//! 3. time cues without explicit or question cues → [`TransitionType::TimeDriven`]
//! 4. no lexical cue at all and urgency above [`EMOTIONAL_URGENCY_THRESHOLD`]
//!    → [`TransitionType::EmotionalDriven`]
//! 5. otherwise → [`TransitionType::NaturalFlow`]

use tangent_core::thread::TransitionType;

use crate::extractor::TransitionCues;

/// Urgency above which an uncued switch counts as emotionally driven.
pub const EMOTIONAL_URGENCY_THRESHOLD: f64 = 0.7;

/// Classifies why the conversation moved.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransitionClassifier;

impl TransitionClassifier {
    /// Classify a transition from the message's cues and emotional urgency.
    pub fn classify(cues: &TransitionCues, urgency: f64) -> TransitionType {
        if !cues.explicit_cues.is_empty() {
            TransitionType::ExplicitSwitch
        } else if !cues.reminder_cues.is_empty() {
            TransitionType::ReminderDriven
        } else if !cues.time_cues.is_empty() && cues.question_cues.is_empty() {
            TransitionType::TimeDriven
        } else if !cues.has_lexical_cue() && urgency > EMOTIONAL_URGENCY_THRESHOLD {
            TransitionType::EmotionalDriven
        } else {
            TransitionType::NaturalFlow
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
