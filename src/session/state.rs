use crate::error::{Result, VamaError};
use serde::Serialize;
use std::fmt;

/// Lifecycle of the single unit of work a session runs at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl RunState {
    pub fn can_transition_to(self, next: RunState) -> bool {
        matches!(
            (self, next),
            (RunState::Idle, RunState::Running)
                | (RunState::Succeeded, RunState::Running)
                | (RunState::Failed, RunState::Running)
                | (RunState::Running, RunState::Succeeded)
                | (RunState::Running, RunState::Failed)
        )
    }

    pub fn transition(self, next: RunState) -> Result<RunState> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(VamaError::InvalidState {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    pub fn is_running(self) -> bool {
        self == RunState::Running
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Succeeded => "succeeded",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What the background unit of work is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Scanning,
    Extracting,
    Parsing,
    Writing,
}

impl Stage {
    pub fn description(self) -> &'static str {
        match self {
            Stage::Scanning => "Scanning folder",
            Stage::Extracting => "Running extractor",
            Stage::Parsing => "Parsing extractor output",
            Stage::Writing => "Writing CSV",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let state = RunState::Idle;
        let state = state.transition(RunState::Running).unwrap();
        assert!(state.is_running());
        let state = state.transition(RunState::Succeeded).unwrap();
        assert!(state.transition(RunState::Running).is_ok());
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(RunState::Idle.transition(RunState::Succeeded).is_err());
        assert!(RunState::Idle.transition(RunState::Failed).is_err());
        assert!(RunState::Running.transition(RunState::Running).is_err());
        assert!(RunState::Succeeded.transition(RunState::Failed).is_err());

        let err = RunState::Running.transition(RunState::Idle).unwrap_err();
        assert_eq!(err.to_string(), "Invalid run state transition: running -> idle");
    }
}
