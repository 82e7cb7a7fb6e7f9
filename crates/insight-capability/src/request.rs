//! Capability requests

use serde_json::Value;

/// One ordered content part
#[derive(Clone, PartialEq, Eq)]
pub enum ContentPart {
    /// Text segment
    Text(String),
    /// Inline binary media
    Media { mime_type: String, data: Vec<u8> },
}

impl ContentPart {
    /// Text content, if this is a text part
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text(t) => Some(t),
            ContentPart::Media { .. } => None,
        }
    }
}

impl std::fmt::Debug for ContentPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentPart::Text(t) => f.debug_tuple("Text").field(&t.chars().count()).finish(),
            ContentPart::Media { mime_type, data } => f
                .debug_struct("Media")
                .field("mime_type", mime_type)
                .field("bytes", &data.len())
                .finish(),
        }
    }
}

/// Generation settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationConfig {
    /// Structured-output schema; when set the response is JSON
    pub response_schema: Option<Value>,
    /// Reasoning budget hint in tokens
    pub thinking_budget: Option<u32>,
    /// Aspect ratio for image generation (`"1:1"`)
    pub aspect_ratio: Option<String>,
}

/// A request to the generative backend
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityRequest {
    /// Model identifier
    pub model: String,
    /// Ordered content parts
    pub parts: Vec<ContentPart>,
    /// Generation settings
    pub config: GenerationConfig,
}

impl CapabilityRequest {
    /// Create new request for a model
    #[inline]
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            parts: Vec::new(),
            config: GenerationConfig::default(),
        }
    }

    /// Append a text part
    #[inline]
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(ContentPart::Text(text.into()));
        self
    }

    /// Append an inline media part
    #[inline]
    #[must_use]
    pub fn with_media(mut self, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.parts.push(ContentPart::Media {
            mime_type: mime_type.into(),
            data,
        });
        self
    }

    /// With structured-output schema
    #[inline]
    #[must_use]
    pub fn with_response_schema(mut self, schema: Value) -> Self {
        self.config.response_schema = Some(schema);
        self
    }

    /// With thinking budget
    #[inline]
    #[must_use]
    pub fn with_thinking_budget(mut self, budget: Option<u32>) -> Self {
        self.config.thinking_budget = budget;
        self
    }

    /// With image aspect ratio
    #[inline]
    #[must_use]
    pub fn with_aspect_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.config.aspect_ratio = Some(ratio.into());
        self
    }

    /// First text part
    #[inline]
    #[must_use]
    pub fn prompt(&self) -> Option<&str> {
        self.parts.iter().find_map(ContentPart::as_text)
    }

    /// Number of media parts
    #[must_use]
    pub fn media_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, ContentPart::Media { .. }))
            .count()
    }
}
