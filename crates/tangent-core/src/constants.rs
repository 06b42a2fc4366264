//! Package-level constants.

/// Current version of tangent (sourced from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix of every derived thread ID.
pub const THREAD_ID_PREFIX: &str = "thr_";

/// Number of hex digits kept from the thread ID digest.
pub const THREAD_ID_HEX_LEN: usize = 16;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
