//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and `#[serde(default)]`
//! so partial JSON is accepted; missing fields get their default value.

mod capacity;
mod routing;

pub use capacity::*;
pub use routing::*;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// ```json
/// {
///   "capacity": { "maxActiveThreads": 8 },
///   "providers": { "emotionTimeoutMs": 500 }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TangentSettings {
    /// Routing thresholds.
    pub routing: RoutingSettings,
    /// Live/background limits and timeout.
    pub capacity: CapacitySettings,
    /// Transition history retention and result-bundle sizes.
    pub history: HistorySettings,
    /// External collaborator settings.
    pub providers: ProviderSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl TangentSettings {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.routing.validate()?;
        self.capacity.validate()?;
        if self.history.max_transitions == 0 {
            return Err(SettingsError::invalid(
                "history.maxTransitions",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Transition history retention and result-bundle sizes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistorySettings {
    /// How long transitions are retained, in seconds.
    pub transition_window_secs: u64,
    /// Hard cap on retained transitions per owner.
    pub max_transitions: usize,
    /// Transitions included in each result bundle.
    pub recent_transitions_limit: usize,
    /// Threads included in each result bundle's summary list.
    pub active_summary_limit: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            transition_window_secs: 24 * 3600,
            max_transitions: 100,
            recent_transitions_limit: 10,
            active_summary_limit: 5,
        }
    }
}

/// External collaborator settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderSettings {
    /// Upper bound on the emotional-signal provider call, in milliseconds.
    pub emotion_timeout_ms: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            emotion_timeout_ms: 250,
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
