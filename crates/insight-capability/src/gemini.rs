//! Gemini `generateContent` backend
//!
//! Maps `CapabilityRequest` onto the REST body, sends it with reqwest and
//! maps the first candidate back into a `CapabilityResponse`.

use crate::error::{parse_http_error, CapabilityError};
use crate::provider::GenerativeCapability;
use crate::request::{CapabilityRequest, ContentPart};
use crate::response::{CapabilityResponse, ResponsePart};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini backend configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key
    pub api_key: Option<String>,
    /// API root URL
    pub base_url: String,
    /// Per-request timeout; `None` waits indefinitely
    pub request_timeout_secs: Option<u64>,
}

impl GeminiConfig {
    /// Configuration with the key taken from `GEMINI_API_KEY` or `API_KEY`
    #[must_use]
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self {
            api_key,
            ..Self::default()
        }
    }

    /// With API key
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// With base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// HTTP client for the Gemini API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create new client
    ///
    /// # Errors
    /// - `CapabilityError::Unauthorized` if no API key is configured
    /// - `CapabilityError::Transport` if the HTTP client cannot be built
    pub fn new(config: GeminiConfig) -> Result<Self, CapabilityError> {
        if config.api_key.is_none() {
            return Err(CapabilityError::Unauthorized(
                "API key not configured for gemini".to_string(),
            ));
        }
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| CapabilityError::Transport(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl GenerativeCapability for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(
        &self,
        request: CapabilityRequest,
    ) -> Result<CapabilityResponse, CapabilityError> {
        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        let body = build_body(&request);

        tracing::debug!(
            model = %request.model,
            parts = request.parts.len(),
            media = request.media_count(),
            structured = request.config.response_schema.is_some(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;

        if !(200..300).contains(&status) {
            return Err(parse_http_error(status, &text));
        }

        parse_body(&text)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody {
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<WireGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct WireContent {
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<WireBlob>,
    #[serde(default, skip_serializing)]
    thought: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBlob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<WireThinkingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<WireImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireImageConfig {
    aspect_ratio: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    #[serde(default)]
    content: WireContent,
}

fn build_body(request: &CapabilityRequest) -> GenerateContentBody {
    let parts = request
        .parts
        .iter()
        .map(|part| match part {
            ContentPart::Text(text) => WirePart {
                text: Some(text.clone()),
                ..WirePart::default()
            },
            ContentPart::Media { mime_type, data } => WirePart {
                inline_data: Some(WireBlob {
                    mime_type: mime_type.clone(),
                    data: STANDARD.encode(data),
                }),
                ..WirePart::default()
            },
        })
        .collect();

    let cfg = &request.config;
    let generation_config = WireGenerationConfig {
        response_mime_type: cfg.response_schema.as_ref().map(|_| "application/json"),
        response_schema: cfg.response_schema.clone(),
        thinking_config: cfg
            .thinking_budget
            .map(|thinking_budget| WireThinkingConfig { thinking_budget }),
        image_config: cfg.aspect_ratio.clone().map(|aspect_ratio| WireImageConfig { aspect_ratio }),
    };
    let has_config = generation_config.response_schema.is_some()
        || generation_config.thinking_config.is_some()
        || generation_config.image_config.is_some();

    GenerateContentBody {
        contents: vec![WireContent { parts }],
        generation_config: has_config.then_some(generation_config),
    }
}

fn parse_body(body: &str) -> Result<CapabilityResponse, CapabilityError> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| CapabilityError::MalformedResponse(format!("generateContent body: {e}")))?;

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        return Ok(CapabilityResponse::default());
    };

    let mut parts = Vec::with_capacity(candidate.content.parts.len());
    for part in candidate.content.parts {
        if part.thought {
            continue;
        }
        if let Some(blob) = part.inline_data {
            let data = STANDARD.decode(blob.data.as_bytes()).map_err(|e| {
                CapabilityError::MalformedResponse(format!("inline data is not base64: {e}"))
            })?;
            parts.push(ResponsePart::InlineData {
                mime_type: blob.mime_type,
                data,
            });
        } else if let Some(text) = part.text {
            parts.push(ResponsePart::Text(text));
        }
    }
    Ok(CapabilityResponse { parts })
}
