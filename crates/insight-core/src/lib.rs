//! Survey Insight Core - analysis orchestration
//!
//! Turns raw survey inputs into typed analytical results through a fallible
//! generative backend:
//! - Builds one schema-constrained request per analysis kind
//! - Retries transient failures with exponential backoff
//! - Decodes raw output into result types, treating empty output as empty
//! - Fans out one portrait call per persona, isolating failures
//! - Holds session state and merges results in `AnalysisController`
//!
//! # Example
//!
//! ```rust,ignore
//! use insight_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let capability = Arc::new(GeminiClient::new(GeminiConfig::from_env())?);
//! let controller = AnalysisController::new(capability, InsightConfig::default());
//!
//! controller.set_table_text("Q1,Q2\nyes,3\nno,5");
//! controller.set_active_kind(AnalysisKind::Statistics);
//! controller.run().await?;
//!
//! println!("{:?}", controller.statistics());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod controller;
pub mod decode;
pub mod error;
pub mod pipeline;
pub mod request;
pub mod retry;
pub mod state;
pub mod telemetry;

pub use config::{InsightConfig, ThinkingBudgets, TruncationBudgets};
pub use controller::{AnalysisController, RunOutcome, SkipReason, ViewState};
pub use decode::{decode, ResponseDecoder};
pub use error::{DecodeError, InsightError};
pub use pipeline::AnalysisPipelines;
pub use request::{truncate_chars, AnalysisRequestBuilder};
pub use retry::{RetryPolicy, Transient};
pub use state::RunState;
pub use telemetry::{init_tracing, LogFormat};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Survey Insight
    pub use crate::{
        AnalysisController, AnalysisPipelines, InsightConfig, InsightError, RetryPolicy,
        RunOutcome,
    };
    pub use insight_capability::{GeminiClient, GeminiConfig, GenerativeCapability};
    pub use insight_model::{AnalysisKind, AnalysisResult, MediaItem, PersonaRecord, SourceBundle};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
