//! Error types for capability calls
//!
//! Errors are split by whether a retry can plausibly help:
//! - Transport faults and server-side 5xx responses are transient
//! - Authorization, validation and malformed-response errors are fatal

/// Signatures of transient faults in otherwise unclassified error messages.
const TRANSIENT_SIGNATURES: [&str; 4] = ["500", "xhr", "Rpc failed", "fetch"];

/// Capability call error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapabilityError {
    /// Connection, DNS, TLS or body-read failure
    #[error("transport failure: {0}")]
    Transport(String),

    /// Server-side failure
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Missing or rejected credentials
    #[error("authorization failed: {0}")]
    Unauthorized(String),

    /// Request rejected as malformed
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Quota or rate limit hit
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Response body did not have the expected envelope
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Anything else
    #[error("{0}")]
    Other(String),
}

impl CapabilityError {
    /// Check if a retry may succeed
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Server { .. } => true,
            Self::Other(message) => TRANSIENT_SIGNATURES.iter().any(|s| message.contains(s)),
            Self::Unauthorized(_)
            | Self::InvalidRequest(_)
            | Self::RateLimited(_)
            | Self::MalformedResponse(_) => false,
        }
    }
}

impl From<reqwest::Error> for CapabilityError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => parse_http_error(status.as_u16(), &err.to_string()),
            None => Self::Transport(err.to_string()),
        }
    }
}

/// Classify a non-success HTTP status
#[must_use]
pub fn parse_http_error(status: u16, body: &str) -> CapabilityError {
    match status {
        401 | 403 => CapabilityError::Unauthorized(body.to_string()),
        400 | 404 | 413 | 422 => CapabilityError::InvalidRequest(body.to_string()),
        429 => CapabilityError::RateLimited(body.to_string()),
        500..=599 => CapabilityError::Server {
            status,
            message: body.to_string(),
        },
        _ => CapabilityError::Other(format!("HTTP {status}: {body}")),
    }
}
