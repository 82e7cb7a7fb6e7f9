//! Competitor breakdown

use crate::schema::OutputContract;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Competitor product analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CompetitorAnalysis {
    /// Visual and interaction design assessment
    pub visual_analysis: String,
    /// Feature set assessment
    pub functional_analysis: String,
    /// Strengths
    pub pros: Vec<String>,
    /// Weaknesses
    pub cons: Vec<String>,
    /// Overall conclusion
    pub conclusion: String,
}

impl OutputContract for CompetitorAnalysis {}
