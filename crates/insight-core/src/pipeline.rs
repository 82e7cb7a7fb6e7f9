//! Analysis pipelines
//!
//! One async method per analysis kind. Each builds its request, runs the
//! capability call and the decode under a single retry policy, and for
//! persona-bearing results fans out one portrait call per persona.
//!
//! Portrait failures are isolated: the persona keeps no portrait and the
//! batch continues. Output order always matches the decoded order.

use crate::config::InsightConfig;
use crate::decode::decode;
use crate::error::InsightError;
use crate::request::AnalysisRequestBuilder;
use crate::retry::RetryPolicy;
use futures::stream::{self, StreamExt};
use insight_capability::{CapabilityRequest, GenerativeCapability};
use insight_model::{
    AnalysisKind, CompetitorAnalysis, ComprehensiveReport, JourneyMap, OpportunityRecord,
    OutputContract, PersonaClusters, PersonaRecord, PortraitRef, SourceBundle, StatisticsResult,
};
use std::sync::Arc;

/// The analysis pipelines over one generative capability
#[derive(Clone)]
pub struct AnalysisPipelines {
    capability: Arc<dyn GenerativeCapability>,
    builder: AnalysisRequestBuilder,
    retry: RetryPolicy,
    portrait_concurrency: usize,
}

impl std::fmt::Debug for AnalysisPipelines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisPipelines")
            .field("capability", &self.capability.name())
            .field("retry", &self.retry)
            .field("portrait_concurrency", &self.portrait_concurrency)
            .finish_non_exhaustive()
    }
}

impl AnalysisPipelines {
    /// Create pipelines from configuration
    #[must_use]
    pub fn new(capability: Arc<dyn GenerativeCapability>, config: Arc<InsightConfig>) -> Self {
        let retry = config.retry;
        let portrait_concurrency = config.portrait_concurrency.max(1);
        Self {
            capability,
            builder: AnalysisRequestBuilder::new(config),
            retry,
            portrait_concurrency,
        }
    }

    /// Request builder in use
    #[inline]
    #[must_use]
    pub fn builder(&self) -> &AnalysisRequestBuilder {
        &self.builder
    }

    /// Survey statistics
    ///
    /// # Errors
    /// - Capability errors once retries are exhausted or on the first fatal one
    /// - `InsightError::Decode` if the output is off-schema
    #[tracing::instrument(skip_all, fields(kind = "statistics"))]
    pub async fn statistics(&self, source: &SourceBundle) -> Result<StatisticsResult, InsightError> {
        let request = self.builder.statistics(source);
        let result: StatisticsResult = self.call_structured(AnalysisKind::Statistics, request).await?;
        tracing::info!(
            charts = result.charts.len(),
            correlations = result.correlations.len(),
            "Statistics complete"
        );
        Ok(result)
    }

    /// Persona clustering followed by portrait fan-out
    ///
    /// # Errors
    /// - As for [`Self::statistics`]; portrait failures are not errors
    #[tracing::instrument(skip_all, fields(kind = "persona_clustering"))]
    pub async fn persona_clustering(
        &self,
        source: &SourceBundle,
    ) -> Result<Vec<PersonaRecord>, InsightError> {
        let request = self.builder.persona_clusters(source);
        let clusters: PersonaClusters =
            self.call_structured(AnalysisKind::PersonaClustering, request).await?;
        Ok(self.attach_portraits(clusters.clusters).await)
    }

    /// Journey map for one persona and theme
    ///
    /// # Errors
    /// - As for [`Self::statistics`]
    #[tracing::instrument(skip_all, fields(kind = "journey_mapping", persona = %persona.name))]
    pub async fn journey_mapping(
        &self,
        persona: &PersonaRecord,
        theme: &str,
        source: &SourceBundle,
    ) -> Result<JourneyMap, InsightError> {
        let request = self.builder.journey(persona, theme, source);
        let journey: JourneyMap = self.call_structured(AnalysisKind::JourneyMapping, request).await?;
        tracing::info!(stages = journey.len(), "Journey complete");
        Ok(journey)
    }

    /// Competitor analysis
    ///
    /// # Errors
    /// - As for [`Self::statistics`]
    #[tracing::instrument(skip_all, fields(kind = "competitor_analysis"))]
    pub async fn competitor_analysis(
        &self,
        source: &SourceBundle,
    ) -> Result<CompetitorAnalysis, InsightError> {
        let request = self.builder.competitor(source);
        self.call_structured(AnalysisKind::CompetitorAnalysis, request).await
    }

    /// Opportunity mining
    ///
    /// # Errors
    /// - As for [`Self::statistics`]
    #[tracing::instrument(skip_all, fields(kind = "opportunity_mining"))]
    pub async fn opportunity_mining(
        &self,
        source: &SourceBundle,
    ) -> Result<Vec<OpportunityRecord>, InsightError> {
        let request = self.builder.opportunities(source);
        self.call_structured(AnalysisKind::OpportunityMining, request).await
    }

    /// Comprehensive report followed by portrait fan-out
    ///
    /// A failure of the combined request fails the whole report; nothing
    /// partial is returned.
    ///
    /// # Errors
    /// - As for [`Self::statistics`]; portrait failures are not errors
    #[tracing::instrument(skip_all, fields(kind = "comprehensive"))]
    pub async fn comprehensive(
        &self,
        source: &SourceBundle,
    ) -> Result<ComprehensiveReport, InsightError> {
        let request = self.builder.comprehensive(source);
        let mut report: ComprehensiveReport =
            self.call_structured(AnalysisKind::Comprehensive, request).await?;
        let personas = std::mem::take(&mut report.personas);
        report.personas = self.attach_portraits(personas).await;
        tracing::info!(
            charts = report.statistics.charts.len(),
            personas = report.personas.len(),
            stages = report.journey.len(),
            opportunities = report.opportunities.len(),
            "Comprehensive report complete"
        );
        Ok(report)
    }

    /// Generate one square portrait
    ///
    /// `Ok(None)` when the backend answered without image data.
    ///
    /// # Errors
    /// - Capability errors once retries are exhausted or on the first fatal one
    pub async fn generate_portrait(&self, prompt: &str) -> Result<Option<PortraitRef>, InsightError> {
        let request = self.builder.portrait(prompt);
        let response = self
            .retry
            .run("portrait", || {
                let capability = Arc::clone(&self.capability);
                let request = request.clone();
                async move { capability.generate(request).await }
            })
            .await?;

        Ok(response
            .first_inline_data()
            .map(|(mime_type, bytes)| PortraitRef::from_image_bytes(mime_type, bytes)))
    }

    /// Issue one portrait call per persona and attach what comes back
    ///
    /// Always returns as many personas as it was given, in the same order.
    pub async fn attach_portraits(&self, mut personas: Vec<PersonaRecord>) -> Vec<PersonaRecord> {
        let prompts: Vec<String> = personas
            .iter()
            .map(|p| p.portrait_prompt().to_string())
            .collect();

        let portraits: Vec<Result<Option<PortraitRef>, InsightError>> = stream::iter(prompts)
            .map(|prompt| async move { self.generate_portrait(&prompt).await })
            .buffered(self.portrait_concurrency)
            .collect()
            .await;

        let mut attached = 0usize;
        for (persona, outcome) in personas.iter_mut().zip(portraits) {
            match outcome {
                Ok(Some(portrait)) => match persona.attach_portrait(portrait) {
                    Ok(()) => attached += 1,
                    Err(e) => tracing::warn!(persona = %persona.name, error = %e, "Portrait not attached"),
                },
                Ok(None) => {
                    tracing::warn!(persona = %persona.name, "Backend returned no image data");
                }
                Err(e) => {
                    tracing::warn!(persona = %persona.name, error = %e, "Portrait generation failed");
                }
            }
        }
        tracing::info!(personas = personas.len(), attached, "Portrait fan-out complete");
        personas
    }

    /// One structured call: generate then decode, retried as a unit
    async fn call_structured<T: OutputContract>(
        &self,
        kind: AnalysisKind,
        request: CapabilityRequest,
    ) -> Result<T, InsightError> {
        tracing::debug!(
            model = %request.model,
            parts = request.parts.len(),
            media = request.media_count(),
            "Dispatching request"
        );
        self.retry
            .run(kind.as_str(), || {
                let capability = Arc::clone(&self.capability);
                let request = request.clone();
                async move {
                    let response = capability.generate(request).await?;
                    let value = decode::<T>(kind, response.text().as_deref())?;
                    Ok::<T, InsightError>(value)
                }
            })
            .await
    }
}
