//! # tangent-signals
//!
//! The lightweight "NLP" layer of the routing engine: lexical heuristics that
//! turn raw message text into signals the router can compare.
//!
//! - [`TextSignalExtractor`]: capability trait; [`LexicalSignalExtractor`] is
//!   the word-list implementation. A statistical extractor can replace it
//!   without touching the router.
//! - [`similarity`]: weighted Jaccard overlap between a message and a thread.
//! - [`classifier`]: maps detected cues to a [`TransitionType`](tangent_core::thread::TransitionType).
//! - [`heuristics`]: local estimators (urgency fallback, engagement, time
//!   sensitivity, open questions, pending actions, resolution cues).
//!
//! Nothing in this crate performs I/O or fails: empty or garbage input yields
//! empty signal sets and zero strength.

#![deny(unsafe_code)]

pub mod classifier;
pub mod extractor;
pub mod heuristics;
pub mod lexicon;
pub mod similarity;

pub use classifier::TransitionClassifier;
pub use extractor::{LexicalSignalExtractor, MessageSignals, TextSignalExtractor, TransitionCues};
pub use heuristics::EmotionalSignal;
pub use similarity::SimilarityScorer;
