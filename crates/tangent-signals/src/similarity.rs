//! Lexical similarity between a message and a thread.
//!
//! `score = 0.7 · jaccard(keywords) + 0.3 · jaccard(themes)`, where each
//! Jaccard term is 0 when either side is empty.

use std::collections::HashSet;

use tangent_core::thread::Thread;

use crate::extractor::MessageSignals;

/// Weight of keyword overlap.
pub const KEYWORD_WEIGHT: f64 = 0.7;
/// Weight of theme overlap.
pub const THEME_WEIGHT: f64 = 0.3;

/// Scores how well a message fits a thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimilarityScorer;

impl SimilarityScorer {
    /// Similarity in `[0, 1]` between a message's signals and a thread's accumulated signals.
    pub fn score(signals: &MessageSignals, thread: &Thread) -> f64 {
        Self::score_sets(
            &signals.keywords,
            &signals.themes,
            &thread.topic_keywords,
            &thread.theme_tags,
        )
    }

    /// Similarity between two keyword/theme set pairs. Symmetric.
    pub fn score_sets<'a, K1, T1, K2, T2>(
        keywords_a: K1,
        themes_a: T1,
        keywords_b: K2,
        themes_b: T2,
    ) -> f64
    where
        K1: IntoIterator<Item = &'a String>,
        T1: IntoIterator<Item = &'a String>,
        K2: IntoIterator<Item = &'a String>,
        T2: IntoIterator<Item = &'a String>,
    {
        let keyword_sim = jaccard(keywords_a, keywords_b);
        let theme_sim = jaccard(themes_a, themes_b);
        (KEYWORD_WEIGHT * keyword_sim + THEME_WEIGHT * theme_sim).clamp(0.0, 1.0)
    }
}

/// `|A ∩ B| / |A ∪ B|`, or 0 if either set is empty.
#[allow(clippy::cast_precision_loss)]
pub fn jaccard<'a>(
    a: impl IntoIterator<Item = &'a String>,
    b: impl IntoIterator<Item = &'a String>,
) -> f64 {
    let a: HashSet<&str> = a.into_iter().map(String::as_str).collect();
    let b: HashSet<&str> = b.into_iter().map(String::as_str).collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(&b).count();
    let union = a.union(&b).count();
    intersection as f64 / union as f64
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
