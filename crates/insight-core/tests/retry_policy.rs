//! Functional tests for retry semantics around capability calls.
//!
//! These tests drive the pipelines against a mocked capability on a paused
//! clock:
//! - Transient failures are retried up to the attempt budget with doubling delays.
//! - Fatal failures (authorization, rate limiting, decode) end the sequence at once.

use async_trait::async_trait;
use insight_capability::{CapabilityError, CapabilityRequest, CapabilityResponse, GenerativeCapability};
use insight_core::{AnalysisPipelines, InsightConfig, InsightError, RetryPolicy};
use insight_model::SourceBundle;
use mockall::{mock, Sequence};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

mock! {
    pub Capability {}

    #[async_trait]
    impl GenerativeCapability for Capability {
        fn name(&self) -> &'static str;
        async fn generate(&self, request: CapabilityRequest) -> Result<CapabilityResponse, CapabilityError>;
    }
}

fn pipelines(mock: MockCapability) -> AnalysisPipelines {
    AnalysisPipelines::new(Arc::new(mock), Arc::new(InsightConfig::default()))
}

fn source() -> SourceBundle {
    SourceBundle::new().with_table_text("q1,q2\n1,2")
}

/// Tenet: a persistently failing server is called exactly max_attempts times,
/// waiting 1s then 2s between attempts, and its error is surfaced.
#[tokio::test(start_paused = true)]
async fn server_errors_exhaust_three_attempts() {
    let mut mock = MockCapability::new();
    mock.expect_name().return_const("mock");
    mock.expect_generate().times(3).returning(|_| {
        Err(CapabilityError::Server {
            status: 503,
            message: "unavailable".into(),
        })
    });

    let start = Instant::now();
    let err = pipelines(mock).statistics(&source()).await.unwrap_err();

    assert!(matches!(
        err,
        InsightError::Capability(CapabilityError::Server { status: 503, .. })
    ));
    assert_eq!(start.elapsed(), Duration::from_millis(3000));
}

/// Tenet: one transient failure followed by success yields the result after
/// a single backoff.
#[tokio::test(start_paused = true)]
async fn transient_then_success_recovers() {
    let mut seq = Sequence::new();
    let mut mock = MockCapability::new();
    mock.expect_name().return_const("mock");
    mock.expect_generate()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(CapabilityError::Other("xhr error".into())));
    mock.expect_generate()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(CapabilityResponse::from_text(r#"[{"category":"Service"}]"#)));

    let start = Instant::now();
    let ops = pipelines(mock).opportunity_mining(&source()).await.unwrap();

    assert_eq!(ops.len(), 1);
    assert_eq!(start.elapsed(), Duration::from_millis(1000));
}

/// Tenet: off-schema output is a decode failure and is never retried.
#[tokio::test(start_paused = true)]
async fn decode_failure_is_not_retried() {
    let mut mock = MockCapability::new();
    mock.expect_name().return_const("mock");
    mock.expect_generate()
        .times(1)
        .returning(|_| Ok(CapabilityResponse::from_text("Sorry, I can't do that.")));

    let start = Instant::now();
    let err = pipelines(mock).competitor_analysis(&source()).await.unwrap_err();

    assert!(matches!(err, InsightError::Decode(_)));
    assert!(!err.is_retryable());
    assert_eq!(start.elapsed(), Duration::ZERO);
}

/// Tenet: authorization and rate-limit failures are fatal on first sight.
#[tokio::test(start_paused = true)]
async fn fatal_capability_errors_are_not_retried() {
    for error in [
        CapabilityError::Unauthorized("bad key".into()),
        CapabilityError::RateLimited("quota".into()),
        CapabilityError::InvalidRequest("too large".into()),
    ] {
        let mut mock = MockCapability::new();
        mock.expect_name().return_const("mock");
        let reply = error.clone();
        mock.expect_generate().times(1).returning(move |_| Err(reply.clone()));

        let err = pipelines(mock).statistics(&source()).await.unwrap_err();
        assert!(matches!(err, InsightError::Capability(ref e) if *e == error));
    }
}

/// Tenet: the retry budget is configuration, and a budget of one means no retries.
#[tokio::test(start_paused = true)]
async fn single_attempt_policy_calls_once() {
    let mut mock = MockCapability::new();
    mock.expect_name().return_const("mock");
    mock.expect_generate()
        .times(1)
        .returning(|_| Err(CapabilityError::Transport("connection reset".into())));

    let config = InsightConfig::default().with_retry(RetryPolicy::no_retry());
    let pipelines = AnalysisPipelines::new(Arc::new(mock), Arc::new(config));

    let err = pipelines.statistics(&source()).await.unwrap_err();
    assert!(err.is_retryable());
}

/// Tenet: a failing portrait is retried on its own; the clustering call is
/// made once.
#[tokio::test(start_paused = true)]
async fn portrait_retries_do_not_repeat_clustering() {
    let mut mock = MockCapability::new();
    mock.expect_name().return_const("mock");
    mock.expect_generate()
        .withf(|r: &CapabilityRequest| r.config.aspect_ratio.is_none())
        .times(1)
        .returning(|_| Ok(CapabilityResponse::from_text(r#"{"clusters":[{"name":"Lin"}]}"#)));
    mock.expect_generate()
        .withf(|r: &CapabilityRequest| r.config.aspect_ratio.is_some())
        .times(3)
        .returning(|_| Err(CapabilityError::Other("Rpc failed due to xhr error".into())));

    let personas = pipelines(mock).persona_clustering(&source()).await.unwrap();

    assert_eq!(personas.len(), 1);
    assert!(personas[0].portrait().is_none());
}
