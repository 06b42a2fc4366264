//! External collaborator seams.
//!
//! Two collaborators feed the router: an emotional-signal provider (async,
//! possibly remote) and a relationship provider (sync lookup). Both are
//! optional. The emotional call is the router's only suspension point and is
//! bounded by a timeout; whatever goes wrong, routing falls back to the local
//! keyword heuristic and carries on.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tangent_core::ids::OwnerId;
use tangent_signals::EmotionalSignal;
use tracing::warn;

use crate::errors::ProviderError;

/// Per-message emotion analysis.
#[async_trait]
pub trait EmotionalSignalProvider: Send + Sync {
    /// Read the emotional content of `text`.
    async fn analyze(
        &self,
        owner_id: &OwnerId,
        text: &str,
    ) -> Result<EmotionalSignal, ProviderError>;
}

/// Relationship profile lookup.
pub trait RelationshipProvider: Send + Sync {
    /// Depth and trust for `owner_id`, if known.
    fn relationship(&self, owner_id: &OwnerId) -> Option<RelationshipContext>;
}

/// Relationship depth and trust, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipContext {
    /// How deep the relationship is.
    pub relationship_depth: f64,
    /// How much the owner trusts the agent.
    pub trust_level: f64,
}

impl Default for RelationshipContext {
    /// Neutral mid-range values, used when no provider answers.
    fn default() -> Self {
        Self {
            relationship_depth: 0.5,
            trust_level: 0.5,
        }
    }
}

impl RelationshipContext {
    /// Clamp both values into `[0, 1]`; non-finite values become neutral.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let fix = |v: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.5 };
        Self {
            relationship_depth: fix(self.relationship_depth),
            trust_level: fix(self.trust_level),
        }
    }
}

/// Ask `provider` for an emotional reading, bounded by `timeout`.
///
/// Timeouts, provider errors and malformed readings are logged at `warn`
/// and replaced with [`EmotionalSignal::local`]. This function cannot fail.
pub async fn resolve_emotion(
    provider: Option<&dyn EmotionalSignalProvider>,
    owner_id: &OwnerId,
    text: &str,
    timeout: Duration,
) -> EmotionalSignal {
    let Some(provider) = provider else {
        return EmotionalSignal::local(text);
    };

    let outcome = match tokio::time::timeout(timeout, provider.analyze(owner_id, text)).await {
        Ok(Ok(signal)) if signal.is_well_formed() => Ok(signal),
        Ok(Ok(signal)) => Err(ProviderError::Invalid(format!(
            "intensity={} urgency={}",
            signal.intensity, signal.urgency_estimate
        ))),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(ProviderError::Timeout(timeout)),
    };

    outcome.unwrap_or_else(|e| {
        warn!(
            owner_id = %owner_id,
            error = %e,
            kind = e.error_kind(),
            "emotional signal provider failed, using local heuristic"
        );
        EmotionalSignal::local(text)
    })
}

/// Look up the relationship context, defaulting to neutral values.
pub fn resolve_relationship(
    provider: Option<&dyn RelationshipProvider>,
    owner_id: &OwnerId,
) -> RelationshipContext {
    provider
        .and_then(|p| p.relationship(owner_id))
        .map(RelationshipContext::sanitized)
        .unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
