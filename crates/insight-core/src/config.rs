//! Survey Insight configuration
//!
//! All knobs have working defaults; a TOML document may override any subset.
//!
//! ```toml
//! text_model = "gemini-3-flash-preview"
//! domain = "health insurance"
//!
//! [retry]
//! max_attempts = 5
//!
//! [budgets]
//! statistics = 40000
//! ```

use crate::error::InsightError;
use crate::retry::RetryPolicy;
use insight_model::AnalysisKind;
use serde::{Deserialize, Serialize};

/// Default text-generation model
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";
/// Default image-generation model
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Model for structured analyses
    pub text_model: String,
    /// Model for persona portraits
    pub image_model: String,
    /// Retry policy applied to every capability call
    pub retry: RetryPolicy,
    /// Source-text truncation budgets, in characters
    pub budgets: TruncationBudgets,
    /// Reasoning budgets for heavier analyses
    pub thinking: ThinkingBudgets,
    /// Maximum portrait requests in flight at once
    pub portrait_concurrency: usize,
    /// Research domain named in prompts
    pub domain: String,
    /// Language the backend should answer in; `None` leaves it to the model
    pub response_language: Option<String>,
    /// Journey theme used until the analyst sets one
    pub default_journey_theme: String,
}

impl InsightConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML; missing keys keep their defaults
    ///
    /// # Errors
    /// - `InsightError::Config` if the document is not valid TOML for this shape
    pub fn from_toml_str(text: &str) -> Result<Self, InsightError> {
        let config: Self = toml::from_str(text).map_err(|e| InsightError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express
    ///
    /// # Errors
    /// - `InsightError::Config` naming the first offending key
    pub fn validate(&self) -> Result<(), InsightError> {
        if self.text_model.trim().is_empty() {
            return Err(InsightError::Config("text_model must not be empty".into()));
        }
        if self.image_model.trim().is_empty() {
            return Err(InsightError::Config("image_model must not be empty".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(InsightError::Config("retry.max_attempts must be at least 1".into()));
        }
        if self.portrait_concurrency == 0 {
            return Err(InsightError::Config("portrait_concurrency must be at least 1".into()));
        }
        Ok(())
    }

    /// With retry policy
    #[inline]
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// With research domain
    #[inline]
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// With response language
    #[inline]
    #[must_use]
    pub fn with_response_language(mut self, language: impl Into<String>) -> Self {
        self.response_language = Some(language.into());
        self
    }

    /// With portrait concurrency
    #[inline]
    #[must_use]
    pub fn with_portrait_concurrency(mut self, limit: usize) -> Self {
        self.portrait_concurrency = limit;
        self
    }
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            retry: RetryPolicy::default(),
            budgets: TruncationBudgets::default(),
            thinking: ThinkingBudgets::default(),
            portrait_concurrency: 8,
            domain: "insurance".to_string(),
            response_language: None,
            default_journey_theme: "Insurance purchase journey".to_string(),
        }
    }
}

/// Per-kind source-text budgets, in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TruncationBudgets {
    /// Statistics source budget
    pub statistics: usize,
    /// Persona clustering source budget
    pub persona_clustering: usize,
    /// Journey mapping source budget
    pub journey_mapping: usize,
    /// Competitor analysis source budget
    pub competitor_analysis: usize,
    /// Opportunity mining source budget
    pub opportunity_mining: usize,
    /// Comprehensive report source budget
    pub comprehensive: usize,
}

impl TruncationBudgets {
    /// Budget for a kind
    #[must_use]
    pub fn for_kind(&self, kind: AnalysisKind) -> usize {
        match kind {
            AnalysisKind::Statistics => self.statistics,
            AnalysisKind::PersonaClustering => self.persona_clustering,
            AnalysisKind::JourneyMapping => self.journey_mapping,
            AnalysisKind::CompetitorAnalysis => self.competitor_analysis,
            AnalysisKind::OpportunityMining => self.opportunity_mining,
            AnalysisKind::Comprehensive => self.comprehensive,
        }
    }
}

impl Default for TruncationBudgets {
    fn default() -> Self {
        Self {
            statistics: 30_000,
            persona_clustering: 20_000,
            journey_mapping: 10_000,
            competitor_analysis: 20_000,
            opportunity_mining: 30_000,
            comprehensive: 30_000,
        }
    }
}

/// Reasoning budgets; kinds without one get no thinking hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThinkingBudgets {
    /// Thinking tokens for statistics
    pub statistics: Option<u32>,
    /// Thinking tokens for the comprehensive report
    pub comprehensive: Option<u32>,
}

impl ThinkingBudgets {
    /// Budget for a kind
    #[must_use]
    pub fn for_kind(&self, kind: AnalysisKind) -> Option<u32> {
        match kind {
            AnalysisKind::Statistics => self.statistics,
            AnalysisKind::Comprehensive => self.comprehensive,
            _ => None,
        }
    }
}

impl Default for ThinkingBudgets {
    fn default() -> Self {
        Self {
            statistics: Some(4000),
            comprehensive: Some(8000),
        }
    }
}
