//! Bridge text and response guidance.
//!
//! Bridge text is a one-line segue naming the outgoing and incoming topics,
//! templated per [`TransitionType`]. Guidance tells the response layer
//! whether to acknowledge the switch, what to follow up on, and which tone
//! to take.

use serde::{Deserialize, Serialize};
use tangent_core::thread::{Transition, TransitionType};

use crate::providers::RelationshipContext;

/// Topic keywords named in a bridge.
pub const BRIDGE_KEYWORDS: usize = 3;
/// Follow-up items carried into guidance.
pub const MAX_FOLLOW_UPS: usize = 3;

const URGENT_TONE_THRESHOLD: f64 = 0.7;
const WARM_TONE_TRUST: f64 = 0.7;

/// Segue from `outgoing` topic keywords to `incoming` ones.
pub fn compose_bridge(kind: TransitionType, outgoing: &[String], incoming: &[String]) -> String {
    let from = topic_label(outgoing, "the previous topic");
    let to = topic_label(incoming, "something new");
    match kind {
        TransitionType::ExplicitSwitch => format!("Switching from {from} to {to}."),
        TransitionType::ReminderDriven => {
            format!("That brings {to} to mind, picking up from {from}.")
        }
        TransitionType::TimeDriven => format!("Moving on in time from {from} to {to}."),
        TransitionType::EmotionalDriven => {
            format!("It sounds like {to} is weighing on you more than {from} right now.")
        }
        TransitionType::NaturalFlow => {
            format!("From {from}, the conversation drifts toward {to}.")
        }
    }
}

fn topic_label(keywords: &[String], fallback: &str) -> String {
    if keywords.is_empty() {
        fallback.to_owned()
    } else {
        keywords[..keywords.len().min(BRIDGE_KEYWORDS)].join(", ")
    }
}

/// Register the response layer should use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// The owner is under pressure.
    Gentle,
    /// The relationship carries high trust.
    Warm,
    /// Default.
    Neutral,
}

impl Tone {
    /// Pick a tone from message urgency and relationship trust.
    pub fn select(urgency: f64, relationship: &RelationshipContext) -> Self {
        if urgency > URGENT_TONE_THRESHOLD {
            Self::Gentle
        } else if relationship.trust_level >= WARM_TONE_TRUST {
            Self::Warm
        } else {
            Self::Neutral
        }
    }
}

/// Hints for whoever writes the reply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseGuidance {
    /// The owner just changed topic.
    pub acknowledge_transition: bool,
    /// Segue for the switch, if there was one.
    pub bridge_text: Option<String>,
    /// Open items left behind in the outgoing thread.
    pub follow_ups: Vec<String>,
    /// Suggested register.
    pub tone: Tone,
}

impl ResponseGuidance {
    /// Build guidance for a routed message.
    pub fn build(
        transition: Option<&Transition>,
        urgency: f64,
        relationship: &RelationshipContext,
    ) -> Self {
        let follow_ups = transition
            .map(|t| {
                let ctx = &t.preserved_context;
                ctx.unresolved_questions
                    .iter()
                    .chain(&ctx.pending_actions)
                    .take(MAX_FOLLOW_UPS)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Self {
            acknowledge_transition: transition.is_some(),
            bridge_text: transition.map(|t| t.bridge_text.clone()),
            follow_ups,
            tone: Tone::select(urgency, relationship),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tangent_core::ids::{OwnerId, ThreadId, TransitionId};
    use tangent_core::thread::PreservedContext;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn bridge_templates_per_type() {
        let out = words(&["work", "stress", "boss", "deadline"]);
        let inc = words(&["speaking", "work", "heard"]);
        assert_eq!(
            compose_bridge(TransitionType::ExplicitSwitch, &out, &inc),
            "Switching from work, stress, boss to speaking, work, heard."
        );
        assert_eq!(
            compose_bridge(TransitionType::NaturalFlow, &out[..1], &inc[..1]),
            "From work, the conversation drifts toward speaking."
        );
        assert!(
            compose_bridge(TransitionType::EmotionalDriven, &out, &inc)
                .starts_with("It sounds like speaking, work, heard is weighing on you")
        );
    }

    #[test]
    fn bridge_fallbacks_for_empty_topics() {
        assert_eq!(
            compose_bridge(TransitionType::TimeDriven, &[], &[]),
            "Moving on in time from the previous topic to something new."
        );
        assert_eq!(
            compose_bridge(TransitionType::ReminderDriven, &[], &words(&["dentist"])),
            "That brings dentist to mind, picking up from the previous topic."
        );
    }

    #[test]
    fn tone_selection() {
        let neutral = RelationshipContext::default();
        let trusted = RelationshipContext {
            relationship_depth: 0.5,
            trust_level: 0.9,
        };
        assert_eq!(Tone::select(0.8, &trusted), Tone::Gentle);
        assert_eq!(Tone::select(0.2, &trusted), Tone::Warm);
        assert_eq!(Tone::select(0.2, &neutral), Tone::Neutral);
        assert_eq!(Tone::select(0.7, &neutral), Tone::Neutral);
    }

    #[test]
    fn guidance_without_transition() {
        let g = ResponseGuidance::build(None, 0.2, &RelationshipContext::default());
        assert!(!g.acknowledge_transition);
        assert!(g.bridge_text.is_none());
        assert!(g.follow_ups.is_empty());
    }

    #[test]
    fn guidance_carries_follow_ups_from_preserved_context() {
        let transition = Transition {
            transition_id: TransitionId::new(),
            owner_id: OwnerId::from("alice"),
            from_thread_id: Some(ThreadId::from("thr_a")),
            to_thread_id: ThreadId::from("thr_b"),
            transition_type: TransitionType::ExplicitSwitch,
            trigger_text: "btw".into(),
            bridge_text: "Switching from a to b.".into(),
            preserved_context: PreservedContext {
                unresolved_questions: words(&["Should I quit?", "What then?"]),
                pending_actions: words(&["I need to call mum", "I have to pay rent"]),
                ..PreservedContext::default()
            },
            occurred_at: Utc::now(),
        };
        let g = ResponseGuidance::build(Some(&transition), 0.9, &RelationshipContext::default());
        assert!(g.acknowledge_transition);
        assert_eq!(g.bridge_text.as_deref(), Some("Switching from a to b."));
        assert_eq!(
            g.follow_ups,
            words(&["Should I quit?", "What then?", "I need to call mum"])
        );
        assert_eq!(g.tone, Tone::Gentle);
    }
}
