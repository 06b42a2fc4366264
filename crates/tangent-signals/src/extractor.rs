//! Text signal extraction.
//!
//! [`TextSignalExtractor`] is the seam between the router and whatever turns
//! text into signals. [`LexicalSignalExtractor`] implements it with the fixed
//! lists in [`crate::lexicon`]: deterministic, pure, and infallible.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::lexicon::{
    CONTRASTIVE_OPENERS, EXPLICIT_CUES, MAX_KEYWORDS, MIN_KEYWORD_LEN, QUESTION_CUES,
    REMINDER_CUES, STOP_WORDS, THEMES, TIME_CUES,
};

/// Strength contributed by any explicit discourse marker.
pub const EXPLICIT_CUE_WEIGHT: f64 = 0.8;
/// Strength contributed by any question-style pivot.
pub const QUESTION_CUE_WEIGHT: f64 = 0.6;
/// Strength contributed by any temporal marker.
pub const TIME_CUE_WEIGHT: f64 = 0.4;
/// Strength contributed by a contrastive first word.
pub const OPENER_WEIGHT: f64 = 0.5;
/// Strength above which a transition counts as strong.
pub const STRONG_TRANSITION_THRESHOLD: f64 = 0.6;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+(?:'[\p{L}]+)*").expect("valid regex"));

/// Lexical cues that a message is changing the subject.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionCues {
    /// Accumulated cue strength in `[0, 1]`.
    pub strength: f64,
    /// Explicit discourse markers found.
    pub explicit_cues: Vec<String>,
    /// Question-style pivots found.
    pub question_cues: Vec<String>,
    /// Temporal markers found.
    pub time_cues: Vec<String>,
    /// Reminder patterns found.
    pub reminder_cues: Vec<String>,
    /// Contrastive first word, if the message opens with one.
    pub opener: Option<String>,
}

impl TransitionCues {
    /// Whether the cues amount to a strong topic break.
    pub fn has_strong_transition(&self) -> bool {
        self.strength > STRONG_TRANSITION_THRESHOLD
    }

    /// Whether any explicit, question, time, or reminder cue was found.
    pub fn has_lexical_cue(&self) -> bool {
        !self.explicit_cues.is_empty()
            || !self.question_cues.is_empty()
            || !self.time_cues.is_empty()
            || !self.reminder_cues.is_empty()
    }
}

/// Everything the router needs to know about one message.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageSignals {
    /// Keywords in first-seen order.
    pub keywords: Vec<String>,
    /// Matched theme labels.
    pub themes: BTreeSet<String>,
    /// Transition cues.
    pub cues: TransitionCues,
}

/// Turns raw message text into routing signals.
pub trait TextSignalExtractor: Send + Sync {
    /// Ordered, deduplicated content keywords.
    fn extract_keywords(&self, text: &str) -> Vec<String>;

    /// Theme labels present in the text.
    fn extract_themes(&self, text: &str) -> BTreeSet<String>;

    /// Cues that the text changes the subject.
    fn detect_transition_cues(&self, text: &str) -> TransitionCues;

    /// All signals for one message.
    fn signals(&self, text: &str) -> MessageSignals {
        MessageSignals {
            keywords: self.extract_keywords(text),
            themes: self.extract_themes(text),
            cues: self.detect_transition_cues(text),
        }
    }
}

/// Word-list implementation of [`TextSignalExtractor`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LexicalSignalExtractor;

impl LexicalSignalExtractor {
    /// Create the extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TextSignalExtractor for LexicalSignalExtractor {
    fn extract_keywords(&self, text: &str) -> Vec<String> {
        let mut keywords: Vec<String> = Vec::new();
        for token in tokenize(text) {
            if token.chars().count() < MIN_KEYWORD_LEN || STOP_WORDS.contains(&token.as_str()) {
                continue;
            }
            if !keywords.contains(&token) {
                keywords.push(token);
            }
            if keywords.len() == MAX_KEYWORDS {
                break;
            }
        }
        keywords
    }

    fn extract_themes(&self, text: &str) -> BTreeSet<String> {
        let lower = normalize(text);
        THEMES
            .iter()
            .filter(|(_, words)| words.iter().any(|w| lower.contains(w)))
            .map(|(theme, _)| (*theme).to_owned())
            .collect()
    }

    fn detect_transition_cues(&self, text: &str) -> TransitionCues {
        let tokens = tokenize(text);
        let phrases = phrase_text(&tokens);

        let explicit_cues = matching_cues(&phrases, EXPLICIT_CUES);
        let question_cues = matching_cues(&phrases, QUESTION_CUES);
        let time_cues = matching_cues(&phrases, TIME_CUES);
        let reminder_cues = matching_cues(&phrases, REMINDER_CUES);
        let opener = tokens
            .first()
            .filter(|first| CONTRASTIVE_OPENERS.contains(&first.as_str()))
            .cloned();

        let mut strength = 0.0;
        if !explicit_cues.is_empty() {
            strength += EXPLICIT_CUE_WEIGHT;
        }
        if !question_cues.is_empty() {
            strength += QUESTION_CUE_WEIGHT;
        }
        if !time_cues.is_empty() {
            strength += TIME_CUE_WEIGHT;
        }
        if opener.is_some() {
            strength += OPENER_WEIGHT;
        }

        TransitionCues {
            strength: f64::min(strength, 1.0),
            explicit_cues,
            question_cues,
            time_cues,
            reminder_cues,
            opener,
        }
    }
}

// ── Shared text helpers ─────────────────────────────────────────────────────

/// Lowercase and fold typographic apostrophes.
pub fn normalize(text: &str) -> String {
    text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

/// Lowercased word tokens, contractions kept whole.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = normalize(text);
    WORD.find_iter(&lower).map(|m| m.as_str().to_owned()).collect()
}

/// Space-joined token stream padded with spaces, for whole-phrase matching.
pub fn phrase_text(tokens: &[String]) -> String {
    format!(" {} ", tokens.join(" "))
}

/// Whether `cue` appears as a whole phrase in text prepared by [`phrase_text`].
pub fn contains_phrase(phrases: &str, cue: &str) -> bool {
    phrases.contains(&format!(" {cue} "))
}

fn matching_cues(phrases: &str, cues: &[&str]) -> Vec<String> {
    cues.iter()
        .filter(|cue| contains_phrase(phrases, cue))
        .map(|cue| (*cue).to_owned())
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
