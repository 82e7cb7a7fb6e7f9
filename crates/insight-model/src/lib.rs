//! Survey Insight Model
//!
//! The typed vocabulary shared by every analysis pipeline:
//! - What the analyst submits (`SourceBundle`, `MediaItem`)
//! - What each analysis kind produces (statistics, personas, journeys,
//!   competitor breakdowns, opportunities, comprehensive reports)
//! - The output schema each result type imposes on the generative backend
//!
//! Result types are the single source of truth for their schemas: the
//! structured-output schema sent to the backend is derived from the Rust
//! type, never written by hand.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod competitor;
pub mod error;
pub mod journey;
pub mod kind;
pub mod opportunity;
pub mod persona;
pub mod report;
pub mod schema;
pub mod source;
pub mod statistics;

mod de;

pub use competitor::CompetitorAnalysis;
pub use error::ModelError;
pub use journey::{EmotionPoint, JourneyMap, JourneyStage, EMOTION_MAX, EMOTION_MIN};
pub use kind::AnalysisKind;
pub use opportunity::OpportunityRecord;
pub use persona::{PersonaClusters, PersonaRecord, PortraitRef};
pub use report::{AnalysisResult, ComprehensiveReport};
pub use schema::{response_schema, OutputContract};
pub use source::{MediaItem, MediaId, SourceBundle};
pub use statistics::{ChartSeries, CorrelationInsight, DataPoint, SortMode, StatisticsResult};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
