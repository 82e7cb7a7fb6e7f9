//! Error types for Survey Insight Core
//!
//! Provides the error taxonomy for analysis runs:
//! - Transient transport failures (retried by `RetryPolicy`)
//! - Fatal request failures (authorization, validation)
//! - Decode failures (output present but off-schema, never retried)
//! - Controller-level conditions (busy, missing journey persona)

use insight_capability::CapabilityError;
use insight_model::{AnalysisKind, ModelError};

/// Main error type
#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    /// Remote capability call failed
    #[error("capability call failed: {0}")]
    Capability(#[from] CapabilityError),

    /// Output could not be decoded into the expected result
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// Input rejected before any call was made
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Input model error
    #[error("invalid input: {0}")]
    Model(#[from] ModelError),

    /// Another run is in flight
    #[error("an analysis is already running ({0})")]
    Busy(AnalysisKind),

    /// Illegal run state transition
    #[error("illegal run state transition: {from} -> {to}")]
    IllegalTransition { from: String, to: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl InsightError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Capability(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Single human-readable message for the presentation layer
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Capability(CapabilityError::Unauthorized(_)) => {
                "The analysis service rejected our credentials. Check the API key.".to_string()
            }
            Self::Capability(CapabilityError::RateLimited(_)) => {
                "The analysis service is rate limiting requests. Try again shortly.".to_string()
            }
            Self::Capability(e) if e.is_transient() => {
                format!("The analysis service is unavailable after several attempts: {e}")
            }
            Self::Decode(e) => format!("The analysis result could not be read: {e}"),
            Self::Busy(kind) => format!("An analysis ({kind}) is already running."),
            other => other.to_string(),
        }
    }
}

/// Structured decoding failure
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Output is not JSON of the expected shape
    #[error("{kind} output does not match its schema: {source}")]
    Malformed {
        kind: AnalysisKind,
        #[source]
        source: serde_json::Error,
    },
}
