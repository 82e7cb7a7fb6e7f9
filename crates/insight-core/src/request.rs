//! Analysis request building
//!
//! For each analysis kind the builder produces one `CapabilityRequest`:
//! a task instruction (with the analyst's instructions embedded), the source
//! text cut to the kind's budget as its own part, any media, and the
//! structured-output schema derived from the result type.
//!
//! Truncation keeps the first N characters. It may split a CSV row or a
//! sentence; the budget is a hard payload bound, not a summariser.

use crate::config::InsightConfig;
use insight_capability::CapabilityRequest;
use insight_model::{
    AnalysisKind, CompetitorAnalysis, ComprehensiveReport, JourneyMap, MediaItem,
    OpportunityRecord, OutputContract, PersonaClusters, PersonaRecord, SourceBundle,
    StatisticsResult,
};
use std::sync::Arc;

/// Aspect ratio requested for persona portraits
pub const PORTRAIT_ASPECT_RATIO: &str = "1:1";

/// Keep at most `max_chars` characters from the start of `text`
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Builds capability requests for every analysis kind
#[derive(Debug, Clone)]
pub struct AnalysisRequestBuilder {
    config: Arc<InsightConfig>,
}

impl AnalysisRequestBuilder {
    /// Create new builder
    #[inline]
    #[must_use]
    pub fn new(config: Arc<InsightConfig>) -> Self {
        Self { config }
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    /// Survey statistics request
    #[must_use]
    pub fn statistics(&self, source: &SourceBundle) -> CapabilityRequest {
        let kind = AnalysisKind::Statistics;
        let task = format!(
            "You are a senior auditor of {domain} research data. Perform an exhaustive \
             statistical and regression analysis of the raw survey data that follows.\n\n\
             Objectives:\n\
             1. Complete identification: find EVERY distinct survey question in the data. \
             Do not sample or skip questions; each question gets its own chart.\n\
             2. Standard statistics: give the full frequency distribution of every question, \
             with the number of respondents who answered it.\n\
             3. Regression: find meaningful relationships between variables, with a \
             correlation coefficient between -1 and 1 and a rationale.\n\
             4. Insight: derive respondent pain points and design opportunities from the \
             complete data.\n\n\
             Analyst instructions: {instructions}{language}",
            domain = self.config.domain,
            instructions = instructions_or_none(source),
            language = self.language_clause(),
        );
        self.structured::<StatisticsResult>(kind, task, &source.table_text, &source.attachments)
    }

    /// Persona clustering request
    #[must_use]
    pub fn persona_clusters(&self, source: &SourceBundle) -> CapabilityRequest {
        let kind = AnalysisKind::PersonaClustering;
        let task = format!(
            "You are a {domain} customer insight expert. Cluster the respondents in the raw \
             data that follows and build one detailed persona per cluster. Every persona needs \
             an evidence chain of verbatim respondent quotes and a short visual description \
             suitable for painting a portrait.\n\n\
             Analyst instructions: {instructions}{language}",
            domain = self.config.domain,
            instructions = instructions_or_none(source),
            language = self.language_clause(),
        );
        self.structured::<PersonaClusters>(kind, task, &source.table_text, &source.attachments)
    }

    /// Journey mapping request for one persona and theme
    #[must_use]
    pub fn journey(
        &self,
        persona: &PersonaRecord,
        theme: &str,
        source: &SourceBundle,
    ) -> CapabilityRequest {
        let kind = AnalysisKind::JourneyMapping;
        let task = format!(
            "Build a {domain} experience journey map in chronological stages. For every stage \
             cover needs, actions, touchpoints, an emotion score from 1 (very negative) to 5 \
             (very positive) with a one-sentence rationale, pain points and opportunities.\n\
             Persona: {name} ({role})\n\
             Journey: {theme}{language}",
            domain = self.config.domain,
            name = persona.name,
            role = persona.role,
            language = self.language_clause(),
        );
        self.structured::<JourneyMap>(kind, task, source.primary_text(), &[])
    }

    /// Competitor analysis request
    #[must_use]
    pub fn competitor(&self, source: &SourceBundle) -> CapabilityRequest {
        let kind = AnalysisKind::CompetitorAnalysis;
        let task = format!(
            "You are a {domain} product expert. Analyse the competitor described in the text \
             that follows{image}: assess its visual design and its feature set, list strengths \
             and weaknesses, and conclude.\n\n\
             Analyst instructions: {instructions}{language}",
            domain = self.config.domain,
            image = if source.reference_image.is_some() {
                " and shown in the attached screenshot"
            } else {
                ""
            },
            instructions = instructions_or_none(source),
            language = self.language_clause(),
        );
        let media: Vec<MediaItem> = source.reference_image.iter().cloned().collect();
        self.structured::<CompetitorAnalysis>(kind, task, source.primary_text(), &media)
    }

    /// Opportunity mining request
    #[must_use]
    pub fn opportunities(&self, source: &SourceBundle) -> CapabilityRequest {
        let kind = AnalysisKind::OpportunityMining;
        let task = format!(
            "Mine {domain} design opportunities from the input that follows. For each \
             opportunity give a category, a description, its expected impact and its \
             feasibility.\n\n\
             Analyst instructions: {instructions}{language}",
            domain = self.config.domain,
            instructions = instructions_or_none(source),
            language = self.language_clause(),
        );
        self.structured::<Vec<OpportunityRecord>>(kind, task, source.primary_text(), &[])
    }

    /// Comprehensive report request
    #[must_use]
    pub fn comprehensive(&self, source: &SourceBundle) -> CapabilityRequest {
        let kind = AnalysisKind::Comprehensive;
        let task = format!(
            "You are a top {domain} consultant. Run a single full-chain analysis of the \
             questionnaire data that follows and produce a complete industry-grade report:\n\
             1. Survey analysis: identify EVERY question, give its distribution, and analyse \
             correlations between variables.\n\
             2. Persona clustering: identify the core customer groups and build detailed \
             personas backed by respondent quotes.\n\
             3. Journey map: for the most representative persona, walk through the full \
             journey in chronological stages with emotion scores from 1 to 5.\n\
             4. Opportunities: list high-value design opportunities across the report.\n\n\
             Analyst instructions: {instructions}{language}",
            domain = self.config.domain,
            instructions = instructions_or_none(source),
            language = self.language_clause(),
        );
        self.structured::<ComprehensiveReport>(kind, task, &source.table_text, &source.attachments)
    }

    /// Square portrait request for a persona
    #[must_use]
    pub fn portrait(&self, prompt: &str) -> CapabilityRequest {
        CapabilityRequest::new(&self.config.image_model)
            .with_text(format!(
                "A realistic, high-quality portrait photograph for a professional user \
                 persona: {prompt}. Clean studio background, natural lighting, \
                 professional {domain} customer style.",
                domain = self.config.domain,
            ))
            .with_aspect_ratio(PORTRAIT_ASPECT_RATIO)
    }

    fn structured<T: OutputContract>(
        &self,
        kind: AnalysisKind,
        task: String,
        source_text: &str,
        media: &[MediaItem],
    ) -> CapabilityRequest {
        let embedded = truncate_chars(source_text, self.config.budgets.for_kind(kind));
        if embedded.len() < source_text.len() {
            tracing::debug!(
                %kind,
                original_chars = source_text.chars().count(),
                budget = self.config.budgets.for_kind(kind),
                "Source text truncated"
            );
        }

        let mut request = CapabilityRequest::new(&self.config.text_model).with_text(task);
        if !embedded.is_empty() {
            request = request.with_text(embedded);
        }
        for item in media {
            request = request.with_media(&item.mime_type, item.data.clone());
        }
        request
            .with_response_schema(T::output_schema())
            .with_thinking_budget(self.config.thinking.for_kind(kind))
    }

    fn language_clause(&self) -> String {
        self.config
            .response_language
            .as_deref()
            .map(|l| format!("\n\nWrite every text field in {l}."))
            .unwrap_or_default()
    }
}

fn instructions_or_none(source: &SourceBundle) -> &str {
    match source.trimmed_instructions() {
        "" => "none",
        s => s,
    }
}
