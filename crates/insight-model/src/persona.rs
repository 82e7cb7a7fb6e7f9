//! User personas
//!
//! Personas are produced by clustering respondents. Each persona carries the
//! prompt used to paint its portrait; the portrait itself is attached later
//! by a separate image-generation step, exactly once.

use crate::error::ModelError;
use crate::schema::OutputContract;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a generated portrait (`data:<mime>;base64,<payload>`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortraitRef(String);

impl PortraitRef {
    /// Build a data URL from raw image bytes
    #[must_use]
    pub fn from_image_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        let mime = if mime_type.is_empty() {
            "image/png"
        } else {
            mime_type
        };
        Self(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
    }

    /// The data URL
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PortraitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Payloads are large; show only the header.
        let header = self.0.split(',').next().unwrap_or_default();
        write!(f, "{header},…")
    }
}

/// A user persona derived from respondent clustering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonaRecord {
    /// Persona name
    pub name: String,
    /// Occupation or life role
    pub role: String,
    /// Age in years
    #[serde(deserialize_with = "crate::de::whole_number")]
    #[schemars(with = "u32")]
    pub age: u32,
    /// Short descriptive tags
    pub tags: Vec<String>,
    /// Biography
    pub bio: String,
    /// Goals
    pub goals: Vec<String>,
    /// Pain points
    pub pain_points: Vec<String>,
    /// Needs specific to the research domain
    #[serde(alias = "insuranceNeeds")]
    pub domain_needs: Vec<String>,
    /// Opportunity points
    pub opportunity_points: Vec<String>,
    /// Verbatim respondent quotes backing the persona
    pub evidence: Vec<String>,
    /// Prompt for the portrait generator
    pub image_prompt: String,
    /// Generated portrait, absent until the image step succeeds
    #[serde(rename = "imageUrl", skip_deserializing, skip_serializing_if = "Option::is_none")]
    #[schemars(skip)]
    portrait: Option<PortraitRef>,
}

impl PersonaRecord {
    /// Create new persona
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            ..Self::default()
        }
    }

    /// With biography
    #[inline]
    #[must_use]
    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }

    /// With image prompt
    #[inline]
    #[must_use]
    pub fn with_image_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.image_prompt = prompt.into();
        self
    }

    /// Prompt to paint this persona: the explicit image prompt, else the bio
    #[must_use]
    pub fn portrait_prompt(&self) -> &str {
        if self.image_prompt.trim().is_empty() {
            &self.bio
        } else {
            &self.image_prompt
        }
    }

    /// Generated portrait, if any
    #[inline]
    #[must_use]
    pub fn portrait(&self) -> Option<&PortraitRef> {
        self.portrait.as_ref()
    }

    /// Attach the generated portrait
    ///
    /// # Errors
    /// - `ModelError::PortraitAlreadyAttached` if a portrait is already set
    pub fn attach_portrait(&mut self, portrait: PortraitRef) -> Result<(), ModelError> {
        if self.portrait.is_some() {
            return Err(ModelError::PortraitAlreadyAttached(self.name.clone()));
        }
        self.portrait = Some(portrait);
        Ok(())
    }
}

/// Wire envelope for persona clustering output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PersonaClusters {
    /// One persona per respondent cluster
    pub clusters: Vec<PersonaRecord>,
}

impl OutputContract for PersonaClusters {}
