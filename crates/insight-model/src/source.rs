//! Analyst inputs
//!
//! A `SourceBundle` is everything a pipeline may draw on: the survey table
//! rendered as text, free-form instructions, attached media and an optional
//! reference image for competitor analysis.

use crate::error::ModelError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Attachment identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MediaId(pub Uuid);

impl MediaId {
    /// Generate new media ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MediaId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Binary media with its MIME type
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Attachment ID
    pub id: MediaId,
    /// Original file name, if known
    pub name: Option<String>,
    /// MIME type (`image/png`, `application/pdf`, ...)
    pub mime_type: String,
    /// Raw bytes
    pub data: Vec<u8>,
}

impl MediaItem {
    /// Create new media item
    #[must_use]
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            id: MediaId::new(),
            name: None,
            mime_type: mime_type.into(),
            data,
        }
    }

    /// With file name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Parse a `data:<mime>;base64,<payload>` URL
    ///
    /// # Errors
    /// - `ModelError::InvalidDataUrl` if the URL is not a base64 data URL
    /// - `ModelError::InvalidBase64` if the payload does not decode
    pub fn from_data_url(url: &str) -> Result<Self, ModelError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| ModelError::InvalidDataUrl("missing data: scheme".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ModelError::InvalidDataUrl("missing payload separator".to_string()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| ModelError::InvalidDataUrl("payload is not base64".to_string()))?;
        let data = STANDARD.decode(payload.trim())?;
        Ok(Self::new(
            if mime_type.is_empty() { "image/png" } else { mime_type },
            data,
        ))
    }

    /// Payload as standard base64
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }

    /// True if there are no bytes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for MediaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaItem")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Inputs to one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBundle {
    /// Survey table or transcript rendered as text
    pub table_text: String,
    /// Free-form analyst instructions
    pub instructions: String,
    /// Attached media (screenshots, scanned questionnaires, ...)
    pub attachments: Vec<MediaItem>,
    /// Reference image for competitor analysis
    pub reference_image: Option<MediaItem>,
}

impl SourceBundle {
    /// Create empty bundle
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With table text
    #[inline]
    #[must_use]
    pub fn with_table_text(mut self, text: impl Into<String>) -> Self {
        self.table_text = text.into();
        self
    }

    /// With instructions
    #[inline]
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// With an attachment
    #[inline]
    #[must_use]
    pub fn with_attachment(mut self, media: MediaItem) -> Self {
        self.attachments.push(media);
        self
    }

    /// With reference image
    #[inline]
    #[must_use]
    pub fn with_reference_image(mut self, image: MediaItem) -> Self {
        self.reference_image = Some(image);
        self
    }

    /// Add an attachment, returning its ID
    pub fn attach(&mut self, media: MediaItem) -> MediaId {
        let id = media.id;
        self.attachments.push(media);
        id
    }

    /// Remove an attachment by ID
    pub fn detach(&mut self, id: MediaId) -> bool {
        let before = self.attachments.len();
        self.attachments.retain(|m| m.id != id);
        self.attachments.len() != before
    }

    /// Set the reference image from a data URL
    ///
    /// # Errors
    /// - `ModelError` if the URL cannot be parsed
    pub fn set_reference_image_data_url(&mut self, url: &str) -> Result<(), ModelError> {
        self.reference_image = Some(MediaItem::from_data_url(url)?);
        Ok(())
    }

    /// Instructions with surrounding whitespace removed
    #[inline]
    #[must_use]
    pub fn trimmed_instructions(&self) -> &str {
        self.instructions.trim()
    }

    /// Table text, falling back to the instructions
    #[must_use]
    pub fn primary_text(&self) -> &str {
        if self.table_text.is_empty() {
            self.trimmed_instructions()
        } else {
            &self.table_text
        }
    }

    /// True if any data source (not counting instructions) is present
    #[must_use]
    pub fn has_source_data(&self) -> bool {
        !self.table_text.is_empty() || !self.attachments.is_empty() || self.reference_image.is_some()
    }

    /// True if there is nothing to analyse
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.has_source_data() && self.trimmed_instructions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bundle_is_empty() {
        assert!(SourceBundle::new().is_empty());
        assert!(SourceBundle::new().with_instructions("   ").is_empty());
    }

    #[test]
    fn any_single_input_makes_bundle_non_empty() {
        assert!(!SourceBundle::new().with_table_text("q1,q2").is_empty());
        assert!(!SourceBundle::new().with_instructions("focus on claims").is_empty());
        assert!(!SourceBundle::new()
            .with_attachment(MediaItem::new("image/png", vec![1]))
            .is_empty());
        assert!(!SourceBundle::new()
            .with_reference_image(MediaItem::new("image/png", vec![1]))
            .is_empty());
    }

    #[test]
    fn primary_text_falls_back_to_instructions() {
        let bundle = SourceBundle::new().with_instructions("  compare apps ");
        assert_eq!(bundle.primary_text(), "compare apps");
        assert!(!bundle.has_source_data());

        let bundle = bundle.with_table_text("a,b");
        assert_eq!(bundle.primary_text(), "a,b");
    }

    #[test]
    fn attach_and_detach() {
        let mut bundle = SourceBundle::new();
        let id = bundle.attach(MediaItem::new("application/pdf", vec![1, 2]).with_name("q.pdf"));
        assert_eq!(bundle.attachments.len(), 1);
        assert!(bundle.detach(id));
        assert!(!bundle.detach(id));
        assert!(bundle.attachments.is_empty());
    }

    #[test]
    fn data_url_parsing() {
        let media = MediaItem::from_data_url("data:image/jpeg;base64,YWJj").unwrap();
        assert_eq!(media.mime_type, "image/jpeg");
        assert_eq!(media.data, b"abc");
        assert_eq!(media.to_base64(), "YWJj");

        assert!(matches!(
            MediaItem::from_data_url("https://example.com/a.png"),
            Err(ModelError::InvalidDataUrl(_))
        ));
        assert!(matches!(
            MediaItem::from_data_url("data:text/plain,hello"),
            Err(ModelError::InvalidDataUrl(_))
        ));
        assert!(matches!(
            MediaItem::from_data_url("data:image/png;base64,@@@"),
            Err(ModelError::InvalidBase64(_))
        ));
    }

    #[test]
    fn debug_does_not_dump_bytes() {
        let media = MediaItem::new("image/png", vec![0; 1024]);
        let rendered = format!("{media:?}");
        assert!(rendered.contains("bytes: 1024"));
    }
}
