//! Error types for the data model

/// Model-level errors
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Input is not a `data:<mime>;base64,<payload>` URL
    #[error("invalid data url: {0}")]
    InvalidDataUrl(String),

    /// Base64 payload could not be decoded
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// Portrait was already attached to this persona
    #[error("portrait already attached to persona {0}")]
    PortraitAlreadyAttached(String),
}
