//! Collaborator error types.

use std::time::Duration;

use thiserror::Error;

/// Failure reported by an external signal provider.
///
/// These never reach the caller of `route_message`: the router logs them
/// and substitutes the local heuristic.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The call did not finish within the configured bound.
    #[error("provider timed out after {0:?}")]
    Timeout(Duration),

    /// The provider could not be reached or refused the request.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The provider answered with something unusable.
    #[error("provider returned an invalid signal: {0}")]
    Invalid(String),
}

impl ProviderError {
    /// Short machine-readable category, used as a log field.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Unavailable(_) => "unavailable",
            Self::Invalid(_) => "invalid",
        }
    }
}
