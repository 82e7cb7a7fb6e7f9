//! Capability responses

/// One response part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart {
    /// Generated text
    Text(String),
    /// Inline binary payload (generated image)
    InlineData { mime_type: String, data: Vec<u8> },
}

/// Response from the generative backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityResponse {
    /// Ordered response parts of the first candidate
    pub parts: Vec<ResponsePart>,
}

impl CapabilityResponse {
    /// Response holding a single text part
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![ResponsePart::Text(text.into())],
        }
    }

    /// Response holding a single inline image
    #[must_use]
    pub fn from_image(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            parts: vec![ResponsePart::InlineData {
                mime_type: mime_type.into(),
                data,
            }],
        }
    }

    /// Concatenated text of all text parts, `None` if there are none
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let mut texts = self.parts.iter().filter_map(|p| match p {
            ResponsePart::Text(t) => Some(t.as_str()),
            ResponsePart::InlineData { .. } => None,
        });
        let first = texts.next()?;
        Some(texts.fold(first.to_string(), |mut acc, t| {
            acc.push_str(t);
            acc
        }))
    }

    /// First inline-binary part as `(mime_type, bytes)`
    #[must_use]
    pub fn first_inline_data(&self) -> Option<(&str, &[u8])> {
        self.parts.iter().find_map(|p| match p {
            ResponsePart::InlineData { mime_type, data } => Some((mime_type.as_str(), data.as_slice())),
            ResponsePart::Text(_) => None,
        })
    }
}
