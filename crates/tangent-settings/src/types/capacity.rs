//! Capacity limits.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Bounds on how many threads an owner may keep live.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapacitySettings {
    /// Maximum live (active or paused) threads per owner.
    pub max_active_threads: usize,
    /// Maximum background threads per owner.
    pub max_background_threads: usize,
    /// Inactivity after which a thread is archived, in seconds.
    pub thread_timeout_secs: u64,
    /// Run a reconciliation pass after every routed message.
    pub reconcile_after_route: bool,
}

impl Default for CapacitySettings {
    fn default() -> Self {
        Self {
            max_active_threads: 5,
            max_background_threads: 20,
            thread_timeout_secs: 48 * 3600,
            reconcile_after_route: true,
        }
    }
}

impl CapacitySettings {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_active_threads == 0 {
            return Err(SettingsError::invalid(
                "capacity.maxActiveThreads",
                "must be at least 1",
            ));
        }
        if self.thread_timeout_secs == 0 {
            return Err(SettingsError::invalid(
                "capacity.threadTimeoutSecs",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}
