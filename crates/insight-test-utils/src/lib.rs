//! Testing utilities for the Survey Insight workspace
//!
//! A scripted capability standing in for the generative backend, plus JSON
//! fixtures shaped like real structured output.

#![allow(missing_docs)]

use async_trait::async_trait;
use insight_capability::{CapabilityError, CapabilityRequest, CapabilityResponse, GenerativeCapability};
use insight_core::{InsightConfig, RetryPolicy};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Bytes returned for every successful portrait
pub const PORTRAIT_BYTES: &[u8] = &[0x89, b'P', b'N', b'G'];

#[derive(Default)]
struct Script {
    text_replies: VecDeque<Result<CapabilityResponse, CapabilityError>>,
    failing_portraits: Vec<(String, CapabilityError)>,
    imageless_portraits: Vec<String>,
    requests: Vec<CapabilityRequest>,
}

/// Capability that answers from a script
///
/// Text requests pop the next scripted reply; an empty queue answers with a
/// non-transient error. Image requests (those with an aspect ratio) succeed
/// with `PORTRAIT_BYTES` unless a failure rule matches their prompt.
#[derive(Default)]
pub struct ScriptedCapability {
    script: Mutex<Script>,
}

impl ScriptedCapability {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a text reply
    pub fn push_text(&self, body: impl Into<String>) -> &Self {
        self.script
            .lock()
            .text_replies
            .push_back(Ok(CapabilityResponse::from_text(body)));
        self
    }

    /// Queue a response with no parts at all
    pub fn push_empty(&self) -> &Self {
        self.script
            .lock()
            .text_replies
            .push_back(Ok(CapabilityResponse::default()));
        self
    }

    /// Queue an error for the next text request
    pub fn push_error(&self, error: CapabilityError) -> &Self {
        self.script.lock().text_replies.push_back(Err(error));
        self
    }

    /// Fail every portrait whose prompt contains `needle`
    pub fn fail_portraits_matching(&self, needle: impl Into<String>, error: CapabilityError) -> &Self {
        self.script.lock().failing_portraits.push((needle.into(), error));
        self
    }

    /// Answer portraits whose prompt contains `needle` with text only
    pub fn imageless_portraits_matching(&self, needle: impl Into<String>) -> &Self {
        self.script.lock().imageless_portraits.push(needle.into());
        self
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<CapabilityRequest> {
        self.script.lock().requests.clone()
    }

    /// Non-portrait requests
    pub fn text_calls(&self) -> usize {
        self.script
            .lock()
            .requests
            .iter()
            .filter(|r| !is_image_request(r))
            .count()
    }

    /// Portrait requests
    pub fn image_calls(&self) -> usize {
        self.script
            .lock()
            .requests
            .iter()
            .filter(|r| is_image_request(r))
            .count()
    }

    /// Text replies not yet consumed
    pub fn remaining_replies(&self) -> usize {
        self.script.lock().text_replies.len()
    }
}

fn is_image_request(request: &CapabilityRequest) -> bool {
    request.config.aspect_ratio.is_some()
}

#[async_trait]
impl GenerativeCapability for ScriptedCapability {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(
        &self,
        request: CapabilityRequest,
    ) -> Result<CapabilityResponse, CapabilityError> {
        let mut script = self.script.lock();
        script.requests.push(request.clone());

        if is_image_request(&request) {
            let prompt = request.prompt().unwrap_or_default();
            if let Some((_, error)) = script
                .failing_portraits
                .iter()
                .find(|(needle, _)| prompt.contains(needle.as_str()))
            {
                return Err(error.clone());
            }
            if script.imageless_portraits.iter().any(|n| prompt.contains(n.as_str())) {
                return Ok(CapabilityResponse::from_text("I cannot draw that."));
            }
            return Ok(CapabilityResponse::from_image("image/png", PORTRAIT_BYTES.to_vec()));
        }

        script
            .text_replies
            .pop_front()
            .unwrap_or_else(|| Err(CapabilityError::InvalidRequest("script exhausted".into())))
    }
}

/// Default configuration with instant retries
pub fn fast_config() -> InsightConfig {
    InsightConfig::default().with_retry(RetryPolicy::new(3, Duration::ZERO))
}

/// Statistics output with one two-option chart per question
pub fn statistics_json(questions: &[&str]) -> String {
    let charts: Vec<Value> = questions
        .iter()
        .map(|q| {
            json!({
                "title": q,
                "totalResponses": 10,
                "data": [{ "label": "Yes", "value": 6 }, { "label": "No", "value": 4 }]
            })
        })
        .collect();
    json!({
        "charts": charts,
        "correlations": [{
            "independentVar": "age",
            "dependentVar": "premium",
            "correlation": 0.42,
            "insight": "Older respondents pay more"
        }],
        "painPoints": ["Claims take too long"],
        "opportunities": ["Self-service claims"],
        "summary": "Respondents want faster claims."
    })
    .to_string()
}

/// One persona object; the image prompt names the persona
pub fn persona_value(name: &str) -> Value {
    json!({
        "name": name,
        "role": "Office worker",
        "age": 34,
        "tags": ["busy"],
        "bio": format!("{name} buys cover online."),
        "goals": ["Save time"],
        "painPoints": ["Paperwork"],
        "domainNeeds": ["Fast claims"],
        "opportunityPoints": ["Mobile app"],
        "evidence": ["\"I never read the policy\""],
        "imagePrompt": format!("portrait of {name}")
    })
}

/// Persona clustering output
pub fn personas_json(names: &[&str]) -> String {
    let clusters: Vec<Value> = names.iter().map(|n| persona_value(n)).collect();
    json!({ "clusters": clusters }).to_string()
}

/// Journey output with emotion scores as given
pub fn journey_value(emotions: &[f64]) -> Value {
    let stages: Vec<Value> = emotions
        .iter()
        .enumerate()
        .map(|(i, e)| {
            json!({
                "phase": format!("Stage {}", i + 1),
                "userNeeds": ["clarity"],
                "actions": ["compare plans"],
                "touchpoints": ["website"],
                "emotions": e,
                "emotionInsight": "mixed feelings",
                "painPoints": ["jargon"],
                "opportunities": ["plain language"]
            })
        })
        .collect();
    Value::Array(stages)
}

/// Journey output as text
pub fn journey_json(emotions: &[f64]) -> String {
    journey_value(emotions).to_string()
}

/// Competitor output
pub fn competitor_json() -> String {
    json!({
        "visualAnalysis": "Clean layout",
        "functionalAnalysis": "Quote in three steps",
        "pros": ["Fast quotes"],
        "cons": ["No chat support"],
        "conclusion": "Strong on onboarding"
    })
    .to_string()
}

/// Opportunity list output
pub fn opportunities_json(count: usize) -> String {
    let items: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "category": "Service",
                "description": format!("Opportunity {i}"),
                "impact": "high",
                "feasibility": "medium"
            })
        })
        .collect();
    Value::Array(items).to_string()
}

/// Comprehensive report output
pub fn comprehensive_json(questions: &[&str], personas: &[&str]) -> String {
    let statistics: Value = serde_json::from_str(&statistics_json(questions)).unwrap_or(Value::Null);
    let personas: Vec<Value> = personas.iter().map(|n| persona_value(n)).collect();
    let opportunities: Value = serde_json::from_str(&opportunities_json(2)).unwrap_or(Value::Null);
    json!({
        "summary": "Full report",
        "dataAnalysis": statistics,
        "personas": personas,
        "journey": journey_value(&[2.0, 4.0]),
        "opportunities": opportunities
    })
    .to_string()
}
