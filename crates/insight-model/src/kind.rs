//! Analysis kinds
//!
//! The closed set of analyses the system can run. The kind selects the
//! pipeline, the request template and the output schema.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Analysis kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    /// Per-question frequency statistics and correlations
    Statistics,
    /// Respondent clustering into personas (with portraits)
    PersonaClustering,
    /// Experience journey for one persona
    JourneyMapping,
    /// Competitor product breakdown
    CompetitorAnalysis,
    /// Design opportunity mining
    OpportunityMining,
    /// All of the above in one combined report
    Comprehensive,
}

impl AnalysisKind {
    /// Every kind, in presentation order
    pub const ALL: [AnalysisKind; 6] = [
        AnalysisKind::Comprehensive,
        AnalysisKind::Statistics,
        AnalysisKind::PersonaClustering,
        AnalysisKind::JourneyMapping,
        AnalysisKind::CompetitorAnalysis,
        AnalysisKind::OpportunityMining,
    ];

    /// Stable machine-readable name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Statistics => "statistics",
            AnalysisKind::PersonaClustering => "persona_clustering",
            AnalysisKind::JourneyMapping => "journey_mapping",
            AnalysisKind::CompetitorAnalysis => "competitor_analysis",
            AnalysisKind::OpportunityMining => "opportunity_mining",
            AnalysisKind::Comprehensive => "comprehensive",
        }
    }

    /// Whether results of this kind carry personas that need portraits
    #[inline]
    #[must_use]
    pub fn fans_out_portraits(&self) -> bool {
        matches!(
            self,
            AnalysisKind::PersonaClustering | AnalysisKind::Comprehensive
        )
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_kinds_are_distinct() {
        let mut names: Vec<_> = AnalysisKind::ALL.iter().map(AnalysisKind::as_str).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), AnalysisKind::ALL.len());
    }

    #[test]
    fn only_persona_kinds_fan_out() {
        assert!(AnalysisKind::PersonaClustering.fans_out_portraits());
        assert!(AnalysisKind::Comprehensive.fans_out_portraits());
        assert!(!AnalysisKind::Statistics.fans_out_portraits());
        assert!(!AnalysisKind::JourneyMapping.fans_out_portraits());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&AnalysisKind::OpportunityMining).unwrap();
        assert_eq!(json, "\"opportunity_mining\"");
    }
}
