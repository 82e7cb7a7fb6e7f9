//! Design opportunities

use crate::schema::OutputContract;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A design opportunity
///
/// Impact and feasibility are free-text labels ("high", "medium", ...);
/// the backend is not constrained to a fixed scale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OpportunityRecord {
    /// Opportunity category
    pub category: String,
    /// What the opportunity is
    pub description: String,
    /// Expected impact
    pub impact: String,
    /// Implementation feasibility
    pub feasibility: String,
}

impl OutputContract for Vec<OpportunityRecord> {}
