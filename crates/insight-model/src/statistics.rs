//! Survey statistics results
//!
//! One `ChartSeries` per survey question, plus cross-question correlations
//! and the pain points and opportunities read off the distributions.

use crate::schema::OutputContract;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One (label, value) pair of a frequency distribution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DataPoint {
    /// Answer option
    pub label: String,
    /// Frequency (count or share) of the option
    pub value: f64,
}

impl DataPoint {
    /// Create new data point
    #[inline]
    #[must_use]
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Presentation order of a chart's data points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// As returned by the backend
    #[default]
    Original,
    /// Largest value first
    Descending,
}

impl SortMode {
    /// The other mode
    #[inline]
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            SortMode::Original => SortMode::Descending,
            SortMode::Descending => SortMode::Original,
        }
    }
}

/// Frequency distribution for one survey question
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartSeries {
    /// Question text
    pub title: String,
    /// Number of respondents who answered
    #[serde(deserialize_with = "crate::de::whole_number")]
    #[schemars(with = "u32")]
    pub total_responses: u32,
    /// Answer distribution in presentation order
    pub data: Vec<DataPoint>,
}

impl ChartSeries {
    /// Sum of all data point values
    #[must_use]
    pub fn value_sum(&self) -> f64 {
        self.data.iter().map(|p| p.value).sum()
    }

    /// Data points in the requested order
    ///
    /// Labels need not be unique; ties keep their original relative order.
    #[must_use]
    pub fn sorted(&self, mode: SortMode) -> Vec<DataPoint> {
        let mut points = self.data.clone();
        if mode == SortMode::Descending {
            points.sort_by(|a, b| b.value.total_cmp(&a.value));
        }
        points
    }
}

/// Relationship between two survey variables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CorrelationInsight {
    /// Independent variable
    #[serde(rename = "independentVar")]
    pub independent: String,
    /// Dependent variable
    #[serde(rename = "dependentVar")]
    pub dependent: String,
    /// Correlation coefficient in [-1, 1]
    pub correlation: f64,
    /// Rationale for the relationship
    pub insight: String,
}

/// Statistics analysis result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct StatisticsResult {
    /// One chart per identified survey question
    pub charts: Vec<ChartSeries>,
    /// Variable correlations
    pub correlations: Vec<CorrelationInsight>,
    /// Respondent pain points
    pub pain_points: Vec<String>,
    /// Design opportunities
    pub opportunities: Vec<String>,
    /// Executive summary
    pub summary: String,
}

impl OutputContract for StatisticsResult {
    fn normalize(&mut self) {
        for c in &mut self.correlations {
            if c.correlation.is_nan() {
                c.correlation = 0.0;
            }
            c.correlation = c.correlation.clamp(-1.0, 1.0);
        }
    }
}
