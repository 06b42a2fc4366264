//! # tangent-settings
//!
//! Configuration management with layered sources for the tangent routing engine.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`TangentSettings::default()`]
//! 2. **User file**: `~/.tangent/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `TANGENT_*` overrides (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! let settings = tangent_settings::load_settings()?;
//! println!("max active threads: {}", settings.capacity.max_active_threads);
//! # Ok::<(), tangent_settings::SettingsError>(())
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let settings = TangentSettings::default();
        assert_eq!(settings.capacity.max_active_threads, 5);
        assert_eq!(settings.capacity.max_background_threads, 20);
        assert_eq!(settings.capacity.thread_timeout_secs, 48 * 3600);
        assert_eq!(settings.routing.continue_window_secs, 2 * 3600);
        assert_eq!(settings.history.transition_window_secs, 24 * 3600);
        assert_eq!(settings.logging.level, "info");
        assert!(settings.validate().is_ok());
    }
}
