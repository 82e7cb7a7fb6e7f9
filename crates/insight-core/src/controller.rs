//! Analysis controller
//!
//! Owns the session: the active analysis kind, the current inputs, the last
//! successful result per kind, the last error and per-run view state.
//! `run()` dispatches the active kind to its pipeline and merges the outcome.
//!
//! The lock is taken only to read or write state; it is never held across
//! a capability call, so accessors stay responsive during a run.

use crate::config::InsightConfig;
use crate::error::InsightError;
use crate::pipeline::AnalysisPipelines;
use crate::state::RunState;
use insight_capability::GenerativeCapability;
use insight_model::{
    AnalysisKind, AnalysisResult, CompetitorAnalysis, ComprehensiveReport, DataPoint, JourneyMap,
    MediaId, MediaItem, OpportunityRecord, PersonaRecord, SortMode, SourceBundle, StatisticsResult,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// What a call to `run()` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The pipeline ran and its result was stored
    Completed(AnalysisKind),
    /// Nothing was dispatched
    Skipped(SkipReason),
}

/// Why a run was not dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No table text, instructions, attachments or reference image
    EmptySource,
    /// Journey mapping without a selected persona
    NoJourneyPersona,
    /// Journey mapping with a blank theme
    NoJourneyTheme,
}

/// Presentation state derived from the current results; reset every run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Sort mode per chart index; absent means original order
    pub chart_sort: BTreeMap<usize, SortMode>,
    /// Indices of personas shown expanded
    pub expanded_personas: BTreeSet<usize>,
}

#[derive(Debug)]
struct ControllerState {
    active_kind: AnalysisKind,
    source: SourceBundle,
    journey_persona: Option<PersonaRecord>,
    journey_theme: String,
    results: BTreeMap<AnalysisKind, AnalysisResult>,
    last_error: Option<(AnalysisKind, String)>,
    run_state: RunState,
    view: ViewState,
}

/// Message recorded when a run future is dropped before it finishes
pub const INTERRUPTED_MESSAGE: &str = "The analysis was interrupted before it finished.";

/// Marks an in-flight run as failed if its future is dropped mid-dispatch
struct RunGuard<'a> {
    state: &'a Mutex<ControllerState>,
    kind: AnalysisKind,
    armed: bool,
}

impl RunGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let kind = self.kind;
        let mut state = self.state.lock();
        tracing::warn!(%kind, "Analysis run dropped before completion");
        state.last_error = Some((kind, INTERRUPTED_MESSAGE.to_string()));
        if let Err(err) = state.run_state.transition(RunState::Failed(kind)) {
            tracing::warn!(%kind, error = %err, "Could not mark interrupted run as failed");
        }
    }
}

/// Single-session orchestration over the analysis pipelines
#[derive(Debug)]
pub struct AnalysisController {
    pipelines: AnalysisPipelines,
    state: Mutex<ControllerState>,
}

impl AnalysisController {
    /// Create controller over a capability
    #[must_use]
    pub fn new(capability: Arc<dyn GenerativeCapability>, config: InsightConfig) -> Self {
        let config = Arc::new(config);
        let state = ControllerState {
            active_kind: AnalysisKind::Comprehensive,
            source: SourceBundle::default(),
            journey_persona: None,
            journey_theme: config.default_journey_theme.clone(),
            results: BTreeMap::new(),
            last_error: None,
            run_state: RunState::Idle,
            view: ViewState::default(),
        };
        Self {
            pipelines: AnalysisPipelines::new(capability, config),
            state: Mutex::new(state),
        }
    }

    /// Pipelines used for dispatch
    #[inline]
    #[must_use]
    pub fn pipelines(&self) -> &AnalysisPipelines {
        &self.pipelines
    }

    /// Run the active analysis kind
    ///
    /// Empty inputs make this a no-op. On success the result replaces the
    /// previous one of the same kind; on failure every stored result is left
    /// as it was and a user-facing message is recorded. Dropping the future
    /// mid-run counts as a failure, so the next call is a plain rerun.
    ///
    /// # Errors
    /// - `InsightError::Busy` if a run is already in flight (no state touched)
    /// - Any pipeline error, after it has been recorded as the last error
    pub async fn run(&self) -> Result<RunOutcome, InsightError> {
        let (kind, source, journey) = {
            let mut state = self.state.lock();
            if let RunState::Running(active) = state.run_state {
                return Err(InsightError::Busy(active));
            }
            let kind = state.active_kind;
            if state.source.is_empty() {
                tracing::info!(%kind, "No source data, nothing to run");
                return Ok(RunOutcome::Skipped(SkipReason::EmptySource));
            }

            let journey = if kind == AnalysisKind::JourneyMapping {
                let Some(persona) = state.journey_persona.clone() else {
                    tracing::info!("No persona selected for journey mapping");
                    return Ok(RunOutcome::Skipped(SkipReason::NoJourneyPersona));
                };
                let theme = state.journey_theme.trim().to_string();
                if theme.is_empty() {
                    tracing::info!("Blank journey theme");
                    return Ok(RunOutcome::Skipped(SkipReason::NoJourneyTheme));
                }
                Some((persona, theme))
            } else {
                None
            };

            state.run_state.transition(RunState::Running(kind))?;
            state.view = ViewState::default();
            (kind, state.source.clone(), journey)
        };

        tracing::info!(%kind, "Analysis run started");
        let guard = RunGuard {
            state: &self.state,
            kind,
            armed: true,
        };
        let outcome = self.dispatch(kind, &source, journey).await;
        guard.disarm();

        let mut state = self.state.lock();
        match outcome {
            Ok(result) => {
                state.results.insert(kind, result);
                state.last_error = None;
                state.run_state.transition(RunState::Succeeded(kind))?;
                tracing::info!(%kind, "Analysis run succeeded");
                Ok(RunOutcome::Completed(kind))
            }
            Err(err) => {
                tracing::error!(%kind, error = %err, "Analysis run failed");
                state.last_error = Some((kind, err.user_message()));
                state.run_state.transition(RunState::Failed(kind))?;
                Err(err)
            }
        }
    }

    async fn dispatch(
        &self,
        kind: AnalysisKind,
        source: &SourceBundle,
        journey: Option<(PersonaRecord, String)>,
    ) -> Result<AnalysisResult, InsightError> {
        let p = &self.pipelines;
        Ok(match kind {
            AnalysisKind::Statistics => AnalysisResult::Statistics(p.statistics(source).await?),
            AnalysisKind::PersonaClustering => {
                AnalysisResult::PersonaClustering(p.persona_clustering(source).await?)
            }
            AnalysisKind::JourneyMapping => {
                let (persona, theme) = journey.ok_or_else(|| {
                    InsightError::InvalidInput("journey mapping needs a persona".into())
                })?;
                AnalysisResult::JourneyMapping(p.journey_mapping(&persona, &theme, source).await?)
            }
            AnalysisKind::CompetitorAnalysis => {
                AnalysisResult::CompetitorAnalysis(p.competitor_analysis(source).await?)
            }
            AnalysisKind::OpportunityMining => {
                AnalysisResult::OpportunityMining(p.opportunity_mining(source).await?)
            }
            AnalysisKind::Comprehensive => AnalysisResult::Comprehensive(p.comprehensive(source).await?),
        })
    }

    // Inputs

    /// Active kind
    #[must_use]
    pub fn active_kind(&self) -> AnalysisKind {
        self.state.lock().active_kind
    }

    /// Select the kind the next `run()` dispatches
    pub fn set_active_kind(&self, kind: AnalysisKind) {
        self.state.lock().active_kind = kind;
    }

    /// Snapshot of the current inputs
    #[must_use]
    pub fn source(&self) -> SourceBundle {
        self.state.lock().source.clone()
    }

    /// Replace all inputs
    pub fn set_source(&self, source: SourceBundle) {
        self.state.lock().source = source;
    }

    /// Set survey table text
    pub fn set_table_text(&self, text: impl Into<String>) {
        self.state.lock().source.table_text = text.into();
    }

    /// Set analyst instructions
    pub fn set_instructions(&self, instructions: impl Into<String>) {
        self.state.lock().source.instructions = instructions.into();
    }

    /// Add an attachment
    pub fn attach(&self, media: MediaItem) -> MediaId {
        self.state.lock().source.attach(media)
    }

    /// Remove an attachment; false if it was not present
    pub fn detach(&self, id: MediaId) -> bool {
        self.state.lock().source.detach(id)
    }

    /// Set the competitor reference image from a data URL
    ///
    /// # Errors
    /// - `InsightError::Model` if the URL is not base64 image data
    pub fn set_reference_image_data_url(&self, url: &str) -> Result<(), InsightError> {
        self.state.lock().source.set_reference_image_data_url(url)?;
        Ok(())
    }

    /// Clear the competitor reference image
    pub fn clear_reference_image(&self) {
        self.state.lock().source.reference_image = None;
    }

    /// Choose the persona for journey mapping and switch to that kind
    pub fn select_persona_for_journey(&self, persona: PersonaRecord) {
        let mut state = self.state.lock();
        tracing::debug!(persona = %persona.name, "Persona selected for journey mapping");
        state.journey_persona = Some(persona);
        state.active_kind = AnalysisKind::JourneyMapping;
    }

    /// Persona selected for journey mapping
    #[must_use]
    pub fn journey_persona(&self) -> Option<PersonaRecord> {
        self.state.lock().journey_persona.clone()
    }

    /// Set the journey theme
    pub fn set_journey_theme(&self, theme: impl Into<String>) {
        self.state.lock().journey_theme = theme.into();
    }

    /// Current journey theme
    #[must_use]
    pub fn journey_theme(&self) -> String {
        self.state.lock().journey_theme.clone()
    }

    // Results

    /// Run state
    #[must_use]
    pub fn run_state(&self) -> RunState {
        self.state.lock().run_state
    }

    /// True while a run is in flight
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.lock().run_state.is_running()
    }

    /// Last stored result of a kind
    #[must_use]
    pub fn result(&self, kind: AnalysisKind) -> Option<AnalysisResult> {
        self.state.lock().results.get(&kind).cloned()
    }

    /// Last error message, if the latest completed run failed
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.state.lock().last_error.as_ref().map(|(_, msg)| msg.clone())
    }

    /// Kind whose run produced the last error
    #[must_use]
    pub fn last_error_kind(&self) -> Option<AnalysisKind> {
        self.state.lock().last_error.as_ref().map(|(kind, _)| *kind)
    }

    /// Latest statistics
    #[must_use]
    pub fn statistics(&self) -> Option<StatisticsResult> {
        match self.result(AnalysisKind::Statistics)? {
            AnalysisResult::Statistics(s) => Some(s),
            _ => None,
        }
    }

    /// Latest clustered personas
    #[must_use]
    pub fn personas(&self) -> Option<Vec<PersonaRecord>> {
        match self.result(AnalysisKind::PersonaClustering)? {
            AnalysisResult::PersonaClustering(p) => Some(p),
            _ => None,
        }
    }

    /// Latest journey map
    #[must_use]
    pub fn journey(&self) -> Option<JourneyMap> {
        match self.result(AnalysisKind::JourneyMapping)? {
            AnalysisResult::JourneyMapping(j) => Some(j),
            _ => None,
        }
    }

    /// Latest competitor analysis
    #[must_use]
    pub fn competitor(&self) -> Option<CompetitorAnalysis> {
        match self.result(AnalysisKind::CompetitorAnalysis)? {
            AnalysisResult::CompetitorAnalysis(c) => Some(c),
            _ => None,
        }
    }

    /// Latest opportunities
    #[must_use]
    pub fn opportunities(&self) -> Option<Vec<OpportunityRecord>> {
        match self.result(AnalysisKind::OpportunityMining)? {
            AnalysisResult::OpportunityMining(o) => Some(o),
            _ => None,
        }
    }

    /// Latest comprehensive report
    #[must_use]
    pub fn comprehensive(&self) -> Option<ComprehensiveReport> {
        match self.result(AnalysisKind::Comprehensive)? {
            AnalysisResult::Comprehensive(r) => Some(r),
            _ => None,
        }
    }

    // View state

    /// Snapshot of the view state
    #[must_use]
    pub fn view_state(&self) -> ViewState {
        self.state.lock().view.clone()
    }

    /// Flip a chart between original and descending order
    pub fn toggle_chart_sort(&self, chart: usize) -> SortMode {
        let mut state = self.state.lock();
        let mode = state.view.chart_sort.entry(chart).or_default();
        *mode = mode.toggled();
        *mode
    }

    /// Points of a chart in its current sort mode
    ///
    /// Charts come from the comprehensive report when that kind is active,
    /// otherwise from the statistics result.
    #[must_use]
    pub fn chart_points(&self, chart: usize) -> Option<Vec<DataPoint>> {
        let state = self.state.lock();
        let stats = match (state.active_kind, &state.results) {
            (AnalysisKind::Comprehensive, results) => match results.get(&AnalysisKind::Comprehensive)? {
                AnalysisResult::Comprehensive(r) => &r.statistics,
                _ => return None,
            },
            (_, results) => match results.get(&AnalysisKind::Statistics)? {
                AnalysisResult::Statistics(s) => s,
                _ => return None,
            },
        };
        let mode = state.view.chart_sort.get(&chart).copied().unwrap_or_default();
        stats.charts.get(chart).map(|c| c.sorted(mode))
    }

    /// Expand or collapse a persona card; returns the new expanded flag
    pub fn toggle_persona_expanded(&self, persona: usize) -> bool {
        let mut state = self.state.lock();
        if state.view.expanded_personas.remove(&persona) {
            false
        } else {
            state.view.expanded_personas.insert(persona);
            true
        }
    }
}
