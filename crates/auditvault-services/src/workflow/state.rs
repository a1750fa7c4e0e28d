use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Position of a submission workflow instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Form,
    Analyzing,
    AnalysisReady,
    Uploading,
    ReadyToSign,
    Signing,
    ReadyToSubmit,
    Submitting,
    Success,
    Error,
}

impl WorkflowState {
    /// States in which an external call is in flight.
    pub fn is_calling(&self) -> bool {
        matches!(
            self,
            WorkflowState::Analyzing
                | WorkflowState::Uploading
                | WorkflowState::Signing
                | WorkflowState::Submitting
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Success)
    }
}

impl Display for WorkflowState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            WorkflowState::Form => write!(f, "form"),
            WorkflowState::Analyzing => write!(f, "analyzing"),
            WorkflowState::AnalysisReady => write!(f, "analysis_ready"),
            WorkflowState::Uploading => write!(f, "uploading"),
            WorkflowState::ReadyToSign => write!(f, "ready_to_sign"),
            WorkflowState::Signing => write!(f, "signing"),
            WorkflowState::ReadyToSubmit => write!(f, "ready_to_submit"),
            WorkflowState::Submitting => write!(f, "submitting"),
            WorkflowState::Success => write!(f, "success"),
            WorkflowState::Error => write!(f, "error"),
        }
    }
}

/// The step whose external call failed and left the workflow in `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedStep {
    Signing,
    Submitting,
}

impl FailedStep {
    /// State that initiated the failed call; `retry` returns there.
    pub fn origin(&self) -> WorkflowState {
        match self {
            FailedStep::Signing => WorkflowState::ReadyToSign,
            FailedStep::Submitting => WorkflowState::ReadyToSubmit,
        }
    }
}

/// What the user is shown while the workflow sits in `Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowFailure {
    pub step: FailedStep,
    pub message: String,
}
