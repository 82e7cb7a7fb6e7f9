//! Controller run state

use crate::error::InsightError;
use insight_model::AnalysisKind;
use serde::Serialize;
use std::fmt;

/// Lifecycle of the controller's single in-flight run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "kind", rename_all = "snake_case")]
pub enum RunState {
    /// Nothing has run yet
    #[default]
    Idle,
    /// A run of this kind is in flight
    Running(AnalysisKind),
    /// Last run of this kind stored its result
    Succeeded(AnalysisKind),
    /// Last run of this kind failed
    Failed(AnalysisKind),
}

/// Discriminant-level states, for transition tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No run yet
    Idle,
    /// A run is in flight
    Running,
    /// Last run stored its result
    Succeeded,
    /// Last run failed or was dropped
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Succeeded => "succeeded",
            Phase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Phases reachable from `from`
#[must_use]
pub fn allowed_transitions(from: Phase) -> Vec<Phase> {
    use Phase::{Failed, Idle, Running, Succeeded};
    match from {
        Idle | Succeeded | Failed => vec![Running],
        Running => vec![Succeeded, Failed],
    }
}

fn allowed(from: Phase, to: Phase) -> bool {
    allowed_transitions(from).into_iter().any(|p| p == to)
}

impl RunState {
    /// Phase of this state
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            RunState::Idle => Phase::Idle,
            RunState::Running(_) => Phase::Running,
            RunState::Succeeded(_) => Phase::Succeeded,
            RunState::Failed(_) => Phase::Failed,
        }
    }

    /// True while a run is in flight
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running(_))
    }

    /// Move to `next`
    ///
    /// # Errors
    /// - `InsightError::Busy` when starting a run while one is in flight
    /// - `InsightError::IllegalTransition` for any other disallowed move
    pub fn transition(&mut self, next: RunState) -> Result<(), InsightError> {
        let (from, to) = (self.phase(), next.phase());
        if !allowed(from, to) {
            return Err(match (*self, to) {
                (RunState::Running(kind), Phase::Running) => InsightError::Busy(kind),
                _ => InsightError::IllegalTransition {
                    from: from.to_string(),
                    to: to.to_string(),
                },
            });
        }
        *self = next;
        Ok(())
    }
}
