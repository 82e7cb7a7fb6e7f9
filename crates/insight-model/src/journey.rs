//! Experience journey maps

use crate::schema::OutputContract;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lowest emotion score
pub const EMOTION_MIN: f64 = 1.0;
/// Highest emotion score
pub const EMOTION_MAX: f64 = 5.0;

/// One phase of the journey
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct JourneyStage {
    /// Phase label
    pub phase: String,
    /// What the user needs in this phase
    #[serde(rename = "userNeeds")]
    pub needs: Vec<String>,
    /// What the user does
    pub actions: Vec<String>,
    /// Channels and artifacts the user touches
    pub touchpoints: Vec<String>,
    /// Emotion score from 1 (very negative) to 5 (very positive)
    #[serde(rename = "emotions")]
    pub emotion: f64,
    /// Short rationale for the emotion score
    pub emotion_insight: String,
    /// Pain points
    pub pain_points: Vec<String>,
    /// Opportunities
    pub opportunities: Vec<String>,
}

/// A point on the emotion curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmotionPoint {
    /// Stage index
    pub stage: usize,
    /// Score mapped onto [0, 1]
    pub level: f64,
}

/// Chronologically ordered journey stages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JourneyMap(pub Vec<JourneyStage>);

impl JourneyMap {
    /// Stages in chronological order
    #[inline]
    #[must_use]
    pub fn stages(&self) -> &[JourneyStage] {
        &self.0
    }

    /// Number of stages
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the map has no stages
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Emotion curve, one point per stage
    #[must_use]
    pub fn emotion_curve(&self) -> Vec<EmotionPoint> {
        self.0
            .iter()
            .enumerate()
            .map(|(stage, s)| EmotionPoint {
                stage,
                level: (s.emotion - EMOTION_MIN) / (EMOTION_MAX - EMOTION_MIN),
            })
            .collect()
    }
}

impl OutputContract for JourneyMap {
    fn normalize(&mut self) {
        for stage in &mut self.0 {
            stage.emotion = if stage.emotion.is_nan() {
                EMOTION_MIN
            } else {
                stage.emotion.clamp(EMOTION_MIN, EMOTION_MAX)
            };
        }
    }
}
