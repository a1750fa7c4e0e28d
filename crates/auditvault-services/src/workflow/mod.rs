//! Inspection submission workflow
//!
//! State machine: `Form → Analyzing → AnalysisReady → Uploading → ReadyToSign
//! → Signing → ReadyToSubmit → Submitting → Success`, with `Error` reachable
//! from the signing and submitting steps.

mod controller;
mod state;

pub use controller::{
    CachedSignature, ConfirmPrompt, ForgeryWarning, SubmissionRecord, SubmissionWorkflow,
};
pub use state::{FailedStep, WorkflowFailure, WorkflowState};
