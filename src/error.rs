//! Error types for the search pipeline.

use thiserror::Error;

/// Errors surfaced by the search pipeline.
///
/// Individual malformed POI records are not an error; the normalizer
/// drops them silently.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The place name resolved to zero candidates.
    #[error("place not found")]
    PlaceNotFound,

    /// An upstream service answered with a non-success status.
    #[error("upstream service returned status {0}")]
    Service(u16),

    /// The transport failed before any status was received.
    #[error("upstream transport error: {0}")]
    Transport(String),

    /// A deadline elapsed before the upstream answered.
    #[error("deadline exceeded")]
    Timeout,

    /// The upstream answered with a payload we could not decode.
    #[error("malformed upstream payload: {0}")]
    InvalidPayload(String),

    /// A newer search superseded this one before it completed.
    #[error("superseded by a newer search")]
    Superseded,
}

impl SearchError {
    /// Human-readable message for the presentation boundary.
    ///
    /// One distinct message per failure family; "no facilities nearby" is
    /// not an error and is worded at the boundary itself.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PlaceNotFound => "We couldn't find that place.",
            Self::Service(_) | Self::Transport(_) | Self::InvalidPayload(_) => {
                "The facility service is currently unavailable."
            }
            Self::Timeout => "The search timed out. Please try again.",
            Self::Superseded => "This search was replaced by a newer one.",
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::InvalidPayload(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Service(status.as_u16())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
