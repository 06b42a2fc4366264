//! Local estimators used when no richer collaborator signal is available.
//!
//! All functions here are pure and cannot fail. The urgency estimate is the
//! mandatory fallback behind the emotional-signal provider.

use serde::{Deserialize, Serialize};

use crate::extractor::{contains_phrase, normalize, phrase_text, tokenize};
use crate::lexicon::{
    COMMITMENT_CUES, RESOLUTION_CUES, STRESS_WORDS, TIME_CUES, TIME_PRESSURE_CUES,
};

/// Urgency assigned when stress or overwhelm language is present.
pub const STRESSED_URGENCY: f64 = 0.8;
/// Urgency assigned otherwise.
pub const BASELINE_URGENCY: f64 = 0.2;

/// Word count at which message length stops adding engagement.
const ENGAGEMENT_WORD_SATURATION: f64 = 30.0;

/// Per-message emotional reading, as produced by a provider or the local fallback.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalSignal {
    /// Dominant emotion label.
    pub primary_emotion: String,
    /// Strength of the emotion in `[0, 1]`.
    pub intensity: f64,
    /// How pressing the message is in `[0, 1]`.
    pub urgency_estimate: f64,
}

impl EmotionalSignal {
    /// Keyword-based reading of `text`. Never fails.
    pub fn local(text: &str) -> Self {
        let urgency = estimate_urgency(text);
        let primary_emotion = if urgency >= STRESSED_URGENCY { "stressed" } else { "neutral" };
        Self {
            primary_emotion: primary_emotion.into(),
            intensity: urgency,
            urgency_estimate: urgency,
        }
    }

    /// Whether both magnitudes are finite and within `[0, 1]`.
    pub fn is_well_formed(&self) -> bool {
        (0.0..=1.0).contains(&self.intensity) && (0.0..=1.0).contains(&self.urgency_estimate)
    }
}

/// Stress/overwhelm lexicon → 0.8, else 0.2.
pub fn estimate_urgency(text: &str) -> f64 {
    if is_stressed(text) {
        STRESSED_URGENCY
    } else {
        BASELINE_URGENCY
    }
}

fn is_stressed(text: &str) -> bool {
    let lower = normalize(text);
    STRESS_WORDS.iter().any(|w| lower.contains(w))
}

/// Engagement of a single message: longer messages, questions and
/// emotional intensity all raise it.
#[allow(clippy::cast_precision_loss)]
pub fn estimate_engagement(text: &str, intensity: f64) -> f64 {
    let words = tokenize(text).len() as f64;
    let length = (words / ENGAGEMENT_WORD_SATURATION).min(1.0);
    let question = if text.contains('?') { 0.15 } else { 0.0 };
    (0.2 + 0.5 * length + question + 0.15 * intensity.clamp(0.0, 1.0)).clamp(0.0, 1.0)
}

/// Deadline language → 0.8, a plain temporal marker → 0.5, else 0.2.
pub fn estimate_time_sensitivity(text: &str) -> f64 {
    let phrases = phrase_text(&tokenize(text));
    if TIME_PRESSURE_CUES.iter().any(|c| contains_phrase(&phrases, c)) {
        0.8
    } else if TIME_CUES.iter().any(|c| contains_phrase(&phrases, c)) {
        0.5
    } else {
        0.2
    }
}

/// Sentences that end in a question mark.
pub fn extract_open_questions(text: &str) -> Vec<String> {
    sentences(text)
        .into_iter()
        .filter(|(_, terminator)| *terminator == Some('?'))
        .map(|(sentence, _)| sentence)
        .collect()
}

/// Sentences containing a commitment phrase ("need to", "going to", …).
pub fn extract_pending_actions(text: &str) -> Vec<String> {
    sentences(text)
        .into_iter()
        .filter(|(sentence, terminator)| {
            *terminator != Some('?') && {
                let phrases = phrase_text(&tokenize(sentence));
                COMMITMENT_CUES.iter().any(|c| contains_phrase(&phrases, c))
            }
        })
        .map(|(sentence, _)| sentence)
        .collect()
}

/// Whether the message says the topic has been wrapped up.
pub fn has_resolution_cue(text: &str) -> bool {
    let phrases = phrase_text(&tokenize(text));
    RESOLUTION_CUES.iter().any(|c| contains_phrase(&phrases, c))
}

/// Split on sentence terminators, keeping which terminator ended each piece.
fn sentences(text: &str) -> Vec<(String, Option<char>)> {
    let mut out = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if matches!(ch, '.' | '!' | '?' | '\n') {
            push_sentence(&mut out, &current, Some(ch));
            current.clear();
        } else {
            current.push(ch);
        }
    }
    push_sentence(&mut out, &current, None);
    out
}

fn push_sentence(out: &mut Vec<(String, Option<char>)>, raw: &str, terminator: Option<char>) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    let sentence = match terminator {
        Some('?') => format!("{trimmed}?"),
        _ => trimmed.to_owned(),
    };
    out.push((sentence, terminator));
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
