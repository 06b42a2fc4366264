//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`TangentSettings::default()`]
//! 2. If `~/.tangent/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use std::str::FromStr;

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::TangentSettings;

/// Resolve the path to the settings file (`~/.tangent/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".tangent").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<TangentSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON or out-of-range values, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<TangentSettings> {
    load_with_env(path, |key| std::env::var(key).ok())
}

fn load_with_env(path: &Path, env: impl Fn(&str) -> Option<String>) -> Result<TangentSettings> {
    let mut layered = serde_json::to_value(TangentSettings::default())?;
    if path.exists() {
        debug!(?path, "loading settings from file");
        let user: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        layered = deep_merge(layered, user);
    } else {
        debug!(?path, "settings file not found, using defaults");
    }

    let mut settings: TangentSettings = serde_json::from_value(layered)?;
    apply_env_overrides(&mut settings, env);
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut merged), Value::Object(overlay)) => {
            for (key, value) in overlay.into_iter().filter(|(_, v)| !v.is_null()) {
                let value = match merged.remove(&key) {
                    Some(base) => deep_merge(base, value),
                    None => value,
                };
                let _ = merged.insert(key, value);
            }
            Value::Object(merged)
        }
        (_, source) => source,
    }
}

/// Apply `TANGENT_*` overrides read through `env`.
///
/// Numeric values outside their range are ignored with a warning and the
/// file/default value is kept.
pub fn apply_env_overrides(settings: &mut TangentSettings, env: impl Fn(&str) -> Option<String>) {
    let env = |key: &str| env(key).filter(|v| !v.is_empty());
    let capacity = &mut settings.capacity;

    if let Some(n) = bounded(&env, "TANGENT_MAX_ACTIVE_THREADS", 1, 1000) {
        capacity.max_active_threads = n;
    }
    if let Some(n) = bounded(&env, "TANGENT_MAX_BACKGROUND_THREADS", 0, 10_000) {
        capacity.max_background_threads = n;
    }
    if let Some(secs) = bounded(&env, "TANGENT_THREAD_TIMEOUT_SECS", 1, 365 * 24 * 3600) {
        capacity.thread_timeout_secs = secs;
    }
    if let Some(secs) = bounded(&env, "TANGENT_CONTINUE_WINDOW_SECS", 1, 7 * 24 * 3600) {
        settings.routing.continue_window_secs = secs;
    }
    if let Some(ms) = bounded(&env, "TANGENT_EMOTION_TIMEOUT_MS", 1, 60_000) {
        settings.providers.emotion_timeout_ms = ms;
    }
    if let Some(level) = env("TANGENT_LOG_LEVEL") {
        settings.logging.level = level;
    }
}

/// Parse `raw` as a number inside `min..=max`.
pub fn parse_bounded<T>(raw: &str, min: T, max: T) -> Option<T>
where
    T: FromStr + PartialOrd,
{
    raw.trim()
        .parse::<T>()
        .ok()
        .filter(|n| (min..=max).contains(n))
}

fn bounded<T>(env: impl Fn(&str) -> Option<String>, key: &str, min: T, max: T) -> Option<T>
where
    T: FromStr + PartialOrd,
{
    let raw = env(key)?;
    let parsed = parse_bounded(&raw, min, max);
    if parsed.is_none() {
        warn!(key, value = %raw, "ignoring out-of-range settings override");
    }
    parsed
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
