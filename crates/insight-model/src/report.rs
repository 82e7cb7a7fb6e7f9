//! Combined report and the kind-tagged result union

use crate::competitor::CompetitorAnalysis;
use crate::journey::JourneyMap;
use crate::kind::AnalysisKind;
use crate::opportunity::OpportunityRecord;
use crate::persona::PersonaRecord;
use crate::schema::OutputContract;
use crate::statistics::StatisticsResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Full-chain report produced by a single comprehensive request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ComprehensiveReport {
    /// Overview of the whole report
    pub summary: String,
    /// Survey statistics
    #[serde(rename = "dataAnalysis")]
    pub statistics: StatisticsResult,
    /// Core respondent personas
    pub personas: Vec<PersonaRecord>,
    /// Journey of the most representative persona
    pub journey: JourneyMap,
    /// Global design opportunities
    pub opportunities: Vec<OpportunityRecord>,
}

impl OutputContract for ComprehensiveReport {
    fn normalize(&mut self) {
        self.statistics.normalize();
        self.journey.normalize();
    }
}

/// Result of one pipeline run, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum AnalysisResult {
    Statistics(StatisticsResult),
    PersonaClustering(Vec<PersonaRecord>),
    JourneyMapping(JourneyMap),
    CompetitorAnalysis(CompetitorAnalysis),
    OpportunityMining(Vec<OpportunityRecord>),
    Comprehensive(ComprehensiveReport),
}

impl AnalysisResult {
    /// Kind that produced this result
    #[must_use]
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisResult::Statistics(_) => AnalysisKind::Statistics,
            AnalysisResult::PersonaClustering(_) => AnalysisKind::PersonaClustering,
            AnalysisResult::JourneyMapping(_) => AnalysisKind::JourneyMapping,
            AnalysisResult::CompetitorAnalysis(_) => AnalysisKind::CompetitorAnalysis,
            AnalysisResult::OpportunityMining(_) => AnalysisKind::OpportunityMining,
            AnalysisResult::Comprehensive(_) => AnalysisKind::Comprehensive,
        }
    }

    /// Personas carried by this result, if any
    #[must_use]
    pub fn personas(&self) -> Option<&[PersonaRecord]> {
        match self {
            AnalysisResult::PersonaClustering(p) => Some(p),
            AnalysisResult::Comprehensive(r) => Some(&r.personas),
            _ => None,
        }
    }
}
