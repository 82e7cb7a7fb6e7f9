//! Functional tests for the analysis controller.
//!
//! These tests exercise the session-level contract:
//! - Empty inputs are a no-op.
//! - Success stores the kind's result; failure records one message and keeps
//!   every prior result.
//! - Only one run is in flight at a time, and a dropped run does not leave
//!   the controller busy.
//! - Per-run view state is reset whenever a run is dispatched.

use async_trait::async_trait;
use insight_capability::{CapabilityError, CapabilityRequest, CapabilityResponse, GenerativeCapability};
use insight_core::controller::INTERRUPTED_MESSAGE;
use insight_core::{AnalysisController, InsightError, RunOutcome, RunState, SkipReason, ViewState};
use insight_model::{AnalysisKind, AnalysisResult, MediaItem, SortMode};
use insight_test_utils::{
    fast_config, journey_json, opportunities_json, personas_json, statistics_json,
    ScriptedCapability,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

fn setup() -> (Arc<ScriptedCapability>, AnalysisController) {
    let capability = ScriptedCapability::new();
    let controller = AnalysisController::new(capability.clone(), fast_config());
    (capability, controller)
}

/// Tenet: with no table text, instructions, attachments or image, run() is a
/// no-op that makes no calls.
#[tokio::test]
async fn empty_source_dispatches_nothing() {
    let (capability, controller) = setup();
    controller.set_instructions("   ");

    let outcome = controller.run().await.unwrap();

    assert_eq!(outcome, RunOutcome::Skipped(SkipReason::EmptySource));
    assert!(capability.requests().is_empty());
    assert_eq!(controller.run_state(), RunState::Idle);
}

/// Tenet: an attachment alone is enough source data to run.
#[tokio::test]
async fn attachment_alone_is_runnable() {
    let (capability, controller) = setup();
    capability.push_text(opportunities_json(1));
    let id = controller.attach(MediaItem::new("image/png", vec![1, 2, 3]));
    controller.set_active_kind(AnalysisKind::OpportunityMining);

    assert_eq!(
        controller.run().await.unwrap(),
        RunOutcome::Completed(AnalysisKind::OpportunityMining)
    );
    assert!(controller.detach(id));
    assert!(!controller.detach(id));
}

/// Tenet: a successful run stores exactly its kind's result.
#[tokio::test]
async fn success_stores_result_for_kind() {
    let (capability, controller) = setup();
    capability.push_text(statistics_json(&["Q1", "Q2"]));
    controller.set_table_text("Q1,Q2\n1,2");
    controller.set_active_kind(AnalysisKind::Statistics);

    controller.run().await.unwrap();

    assert_eq!(controller.statistics().unwrap().charts.len(), 2);
    assert!(matches!(
        controller.result(AnalysisKind::Statistics),
        Some(AnalysisResult::Statistics(_))
    ));
    assert!(controller.personas().is_none());
    assert_eq!(controller.run_state(), RunState::Succeeded(AnalysisKind::Statistics));
    assert!(controller.last_error().is_none());
}

/// Tenet: a failed run records one user-facing message and leaves every
/// previously stored result untouched.
#[tokio::test]
async fn failure_keeps_prior_results() {
    let (capability, controller) = setup();
    capability
        .push_text(statistics_json(&["Q1"]))
        .push_error(CapabilityError::Unauthorized("bad key".into()));
    controller.set_table_text("Q1\nyes");
    controller.set_active_kind(AnalysisKind::Statistics);
    controller.run().await.unwrap();
    let before = controller.statistics();

    let err = controller.run().await.unwrap_err();

    assert!(matches!(err, InsightError::Capability(CapabilityError::Unauthorized(_))));
    assert_eq!(controller.statistics(), before);
    assert_eq!(controller.run_state(), RunState::Failed(AnalysisKind::Statistics));
    assert_eq!(controller.last_error_kind(), Some(AnalysisKind::Statistics));
    let message = controller.last_error().unwrap();
    assert!(message.contains("API key"), "{message}");
}

/// Tenet: re-running after a failure is a plain run, and success clears the error.
#[tokio::test]
async fn rerun_after_failure_recovers() {
    let (capability, controller) = setup();
    capability
        .push_text("not json at all")
        .push_text(opportunities_json(2));
    controller.set_table_text("rows");
    controller.set_active_kind(AnalysisKind::OpportunityMining);

    assert!(matches!(controller.run().await, Err(InsightError::Decode(_))));
    assert!(controller.last_error().is_some());

    controller.run().await.unwrap();
    assert_eq!(controller.opportunities().unwrap().len(), 2);
    assert!(controller.last_error().is_none());
}

/// Tenet: choosing a persona hands it to journey mapping, and the journey run
/// does not disturb the persona result.
#[tokio::test]
async fn persona_hand_off_to_journey() {
    let (capability, controller) = setup();
    capability
        .push_text(personas_json(&["Ana", "Ben"]))
        .push_text(journey_json(&[2.0, 4.0, 3.0]));
    controller.set_table_text("interviews");
    controller.set_active_kind(AnalysisKind::PersonaClustering);
    controller.run().await.unwrap();

    let ben = controller.personas().unwrap()[1].clone();
    controller.select_persona_for_journey(ben);
    assert_eq!(controller.active_kind(), AnalysisKind::JourneyMapping);
    controller.set_journey_theme("Renewing a policy");
    controller.run().await.unwrap();

    assert_eq!(controller.journey().unwrap().len(), 3);
    assert_eq!(controller.personas().unwrap().len(), 2);
    let journey_request = capability.requests().pop().unwrap();
    let prompt = journey_request.prompt().unwrap();
    assert!(prompt.contains("Persona: Ben"));
    assert!(prompt.contains("Journey: Renewing a policy"));
}

/// Tenet: journey mapping uses the configured default theme until one is set.
#[tokio::test]
async fn journey_theme_defaults_from_config() {
    let (_, controller) = setup();
    assert_eq!(controller.journey_theme(), fast_config().default_journey_theme);
}

/// Tenet: view state (chart sort, expanded personas) is cleared by every run.
#[tokio::test]
async fn view_state_resets_on_run() {
    let (capability, controller) = setup();
    capability
        .push_text(statistics_json(&["Q1"]))
        .push_text(statistics_json(&["Q1"]));
    controller.set_table_text("Q1\nyes");
    controller.set_active_kind(AnalysisKind::Statistics);
    controller.run().await.unwrap();

    assert_eq!(controller.toggle_chart_sort(0), SortMode::Descending);
    assert!(controller.toggle_persona_expanded(1));
    assert_ne!(controller.view_state(), ViewState::default());

    controller.run().await.unwrap();
    assert_eq!(controller.view_state(), ViewState::default());
}

/// Capability whose first text call waits until released
struct GatedCapability {
    gate: Notify,
}

#[async_trait]
impl GenerativeCapability for GatedCapability {
    fn name(&self) -> &'static str {
        "gated"
    }

    async fn generate(
        &self,
        _request: CapabilityRequest,
    ) -> Result<CapabilityResponse, CapabilityError> {
        self.gate.notified().await;
        Ok(CapabilityResponse::from_text(opportunities_json(1)))
    }
}

/// Tenet: a second run while one is in flight is rejected as busy and
/// touches neither results nor the stored error.
#[tokio::test]
async fn concurrent_run_is_busy() {
    let capability = Arc::new(GatedCapability { gate: Notify::new() });
    let controller = AnalysisController::new(capability.clone(), fast_config());
    controller.set_table_text("rows");
    controller.set_active_kind(AnalysisKind::OpportunityMining);

    let second = async {
        while !controller.is_running() {
            tokio::task::yield_now().await;
        }
        let outcome = controller.run().await;
        capability.gate.notify_one();
        outcome
    };
    let (first, second) = tokio::join!(controller.run(), second);

    assert_eq!(first.unwrap(), RunOutcome::Completed(AnalysisKind::OpportunityMining));
    assert!(matches!(second, Err(InsightError::Busy(AnalysisKind::OpportunityMining))));
    assert!(controller.last_error().is_none());
    assert_eq!(controller.opportunities().unwrap().len(), 1);
}

/// Tenet: the busy check comes first, so a run requested mid-flight on an
/// emptied source is still rejected as busy rather than skipped.
#[tokio::test]
async fn busy_check_precedes_input_checks() {
    let capability = Arc::new(GatedCapability { gate: Notify::new() });
    let controller = AnalysisController::new(capability.clone(), fast_config());
    controller.set_table_text("rows");
    controller.set_active_kind(AnalysisKind::OpportunityMining);

    let second = async {
        while !controller.is_running() {
            tokio::task::yield_now().await;
        }
        controller.set_table_text("");
        let outcome = controller.run().await;
        capability.gate.notify_one();
        outcome
    };
    let (first, second) = tokio::join!(controller.run(), second);

    assert_eq!(first.unwrap(), RunOutcome::Completed(AnalysisKind::OpportunityMining));
    assert!(matches!(second, Err(InsightError::Busy(AnalysisKind::OpportunityMining))));
}

/// Tenet: a run whose future is dropped mid-flight is recorded as failed, and
/// the next run() is a plain rerun.
#[tokio::test(start_paused = true)]
async fn dropped_run_is_failed_and_can_rerun() {
    let capability = Arc::new(GatedCapability { gate: Notify::new() });
    let controller = AnalysisController::new(capability.clone(), fast_config());
    controller.set_table_text("rows");
    controller.set_active_kind(AnalysisKind::OpportunityMining);

    let timed_out = tokio::time::timeout(Duration::from_secs(1), controller.run()).await;

    assert!(timed_out.is_err());
    assert!(!controller.is_running());
    assert_eq!(controller.run_state(), RunState::Failed(AnalysisKind::OpportunityMining));
    assert_eq!(controller.last_error().as_deref(), Some(INTERRUPTED_MESSAGE));
    assert!(controller.opportunities().is_none());

    capability.gate.notify_one();
    let outcome = controller.run().await.unwrap();

    assert_eq!(outcome, RunOutcome::Completed(AnalysisKind::OpportunityMining));
    assert_eq!(controller.opportunities().unwrap().len(), 1);
    assert!(controller.last_error().is_none());
}
