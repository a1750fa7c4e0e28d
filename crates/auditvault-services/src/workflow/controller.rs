//! Inspection submission controller
//!
//! One [`SubmissionWorkflow`] drives one submission through
//! analyze → review → upload → sign → submit. Each step that talks to an
//! external service moves the instance into a calling state first; while it is
//! there every other trigger is refused, so at most one call is in flight per
//! instance. Calls are never retried automatically.
//!
//! The signed payload is cached in the session store so that a restarted
//! client resumes at `ReadyToSubmit`; the cache is dropped on success and on
//! abandon.

use std::sync::Arc;

use auditvault_core::constants::SIGNED_PAYLOAD_KEY;
use auditvault_core::models::{
    AnalysisResult, AnalysisSummary, ContentReference, InspectionMeta, SignedPayload,
    SubmissionMeta, SubmissionReceipt, SubmitInspectionRequest, UploadedFile,
};
use auditvault_core::{AnalysisGateway, AppError, ErrorMetadata, LedgerGateway};
use serde::{Deserialize, Serialize};

use super::state::{FailedStep, WorkflowFailure, WorkflowState};
use crate::storage::{KeyValueStore, KeyValueStoreExt};

/// Shown to the user before uploading a file whose analysis flagged anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgeryWarning {
    pub file_name: String,
    pub summary: AnalysisSummary,
}

impl ForgeryWarning {
    pub fn message(&self) -> String {
        format!(
            "Forgery detected in {}: {} of {} results are not Real. Continue anyway?",
            self.file_name,
            self.summary.not_real(),
            self.summary.total
        )
    }
}

/// Blocking yes/no decision on a [`ForgeryWarning`].
pub trait ConfirmPrompt {
    fn confirm(&self, warning: &ForgeryWarning) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: Fn(&ForgeryWarning) -> bool,
{
    fn confirm(&self, warning: &ForgeryWarning) -> bool {
        self(warning)
    }
}

/// What the session store keeps between restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedSignature {
    pub content: ContentReference,
    pub payload: SignedPayload,
    pub file_name: String,
    pub summary: AnalysisSummary,
    #[serde(default)]
    pub meta: InspectionMeta,
}

/// One completed workflow instance.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRecord {
    pub file_name: String,
    pub meta: InspectionMeta,
    pub summary: AnalysisSummary,
    pub content: ContentReference,
    pub payload: SignedPayload,
    pub receipt: SubmissionReceipt,
}

pub struct SubmissionWorkflow {
    analysis: Arc<dyn AnalysisGateway>,
    ledger: Arc<dyn LedgerGateway>,
    session: Arc<dyn KeyValueStore>,
    state: WorkflowState,
    file: Option<UploadedFile>,
    file_name: Option<String>,
    meta: InspectionMeta,
    results: Vec<AnalysisResult>,
    summary: Option<AnalysisSummary>,
    content: Option<ContentReference>,
    signed: Option<SignedPayload>,
    failure: Option<WorkflowFailure>,
    completed: Option<SubmissionRecord>,
}

impl SubmissionWorkflow {
    pub fn new(
        analysis: Arc<dyn AnalysisGateway>,
        ledger: Arc<dyn LedgerGateway>,
        session: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            analysis,
            ledger,
            session,
            state: WorkflowState::Form,
            file: None,
            file_name: None,
            meta: InspectionMeta::default(),
            results: Vec::new(),
            summary: None,
            content: None,
            signed: None,
            failure: None,
            completed: None,
        }
    }

    /// Build a workflow, resuming at `ReadyToSubmit` if the session holds a
    /// signed payload from an earlier run.
    pub fn restore(
        analysis: Arc<dyn AnalysisGateway>,
        ledger: Arc<dyn LedgerGateway>,
        session: Arc<dyn KeyValueStore>,
    ) -> Result<Self, AppError> {
        let cached = match session.get_json::<CachedSignature>(SIGNED_PAYLOAD_KEY) {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable cached signed payload");
                session.remove(SIGNED_PAYLOAD_KEY)?;
                None
            }
        };
        let mut workflow = Self::new(analysis, ledger, session);

        if let Some(cached) = cached {
            tracing::info!(ipfs_cid = %cached.content.ipfs_cid, "Resuming workflow from cached signed payload");
            workflow.file_name = Some(cached.file_name);
            workflow.summary = Some(cached.summary);
            workflow.meta = cached.meta;
            workflow.content = Some(cached.content);
            workflow.signed = Some(cached.payload);
            workflow.state = WorkflowState::ReadyToSubmit;
        }

        Ok(workflow)
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn failure(&self) -> Option<&WorkflowFailure> {
        self.failure.as_ref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn results(&self) -> &[AnalysisResult] {
        &self.results
    }

    pub fn summary(&self) -> Option<AnalysisSummary> {
        self.summary
    }

    pub fn content(&self) -> Option<&ContentReference> {
        self.content.as_ref()
    }

    pub fn signed_payload(&self) -> Option<&SignedPayload> {
        self.signed.as_ref()
    }

    pub fn completed(&self) -> Option<&SubmissionRecord> {
        self.completed.as_ref()
    }

    pub fn can_sign(&self) -> bool {
        self.state == WorkflowState::ReadyToSign && self.content.is_some()
    }

    pub fn can_submit(&self) -> bool {
        self.state == WorkflowState::ReadyToSubmit
            && self.content.is_some()
            && self.signed.is_some()
    }

    fn transition(&mut self, to: WorkflowState) {
        tracing::info!(from = %self.state, to = %to, "Workflow transition");
        self.state = to;
    }

    fn ensure(&self, expected: WorkflowState, action: &'static str) -> Result<(), AppError> {
        if self.state.is_calling() {
            return Err(AppError::CallInFlight);
        }
        if self.state != expected {
            return Err(AppError::InvalidTransition {
                from: self.state.to_string(),
                action,
            });
        }
        Ok(())
    }

    fn fail(&mut self, step: FailedStep, err: &AppError) {
        tracing::warn!(step = ?step, error = %err.detailed_message(), "Workflow step failed");
        self.failure = Some(WorkflowFailure {
            step,
            message: err.client_message(),
        });
        self.transition(WorkflowState::Error);
    }

    /// Choose the file and form fields for this submission.
    pub fn select_file(
        &mut self,
        file: UploadedFile,
        meta: InspectionMeta,
    ) -> Result<(), AppError> {
        self.ensure(WorkflowState::Form, "select a file")?;
        if file.name().trim().is_empty() || file.is_empty() {
            return Err(AppError::Validation("Selected file is empty".to_string()));
        }
        self.file_name = Some(file.name().to_string());
        self.file = Some(file);
        self.meta = meta;
        Ok(())
    }

    /// Form → Analyzing → AnalysisReady. On failure the workflow stays in
    /// `Form` with the selection kept.
    pub async fn analyze(&mut self) -> Result<AnalysisSummary, AppError> {
        self.ensure(WorkflowState::Form, "analyze")?;
        let file = self
            .file
            .clone()
            .ok_or_else(|| AppError::Validation("Please select a file first".to_string()))?;

        self.transition(WorkflowState::Analyzing);
        match self.analysis.analyze(&file).await {
            Ok(response) => {
                let summary = response.effective_summary();
                tracing::info!(
                    real = summary.real,
                    fake = summary.fake,
                    total = summary.total,
                    "Analysis complete"
                );
                self.results = response.results;
                self.summary = Some(summary);
                self.transition(WorkflowState::AnalysisReady);
                Ok(summary)
            }
            Err(e) => {
                self.transition(WorkflowState::Form);
                Err(AppError::Analysis(e))
            }
        }
    }

    /// Warning the user must accept before upload, if the analysis flagged anything.
    pub fn pending_warning(&self) -> Option<ForgeryWarning> {
        let summary = self.summary?;
        if !summary.has_suspect() {
            return None;
        }
        Some(ForgeryWarning {
            file_name: self.file_name.clone().unwrap_or_default(),
            summary,
        })
    }

    /// AnalysisReady → Uploading → ReadyToSign.
    ///
    /// When the analysis flagged anything `prompt` is asked first; declining
    /// leaves the workflow in `AnalysisReady` without any network call. Upload
    /// failures also return to `AnalysisReady`.
    pub async fn begin_upload(
        &mut self,
        prompt: &dyn ConfirmPrompt,
    ) -> Result<ContentReference, AppError> {
        self.ensure(WorkflowState::AnalysisReady, "upload")?;

        if let Some(warning) = self.pending_warning() {
            if !prompt.confirm(&warning) {
                tracing::info!(file = %warning.file_name, "Upload cancelled after forgery warning");
                return Err(AppError::UserCancelled(
                    "Submission cancelled after forgery warning".to_string(),
                ));
            }
        }

        let file = self.file.clone().ok_or_else(|| {
            AppError::MissingPrerequisite("No file selected for upload".to_string())
        })?;

        self.transition(WorkflowState::Uploading);
        match self.ledger.upload_file(&file).await {
            Ok(content) => {
                tracing::info!(ipfs_cid = %content.ipfs_cid, "File stored");
                self.content = Some(content.clone());
                self.transition(WorkflowState::ReadyToSign);
                Ok(content)
            }
            Err(e) => {
                self.transition(WorkflowState::AnalysisReady);
                Err(AppError::Upload(e))
            }
        }
    }

    /// ReadyToSign → Signing → ReadyToSubmit. Failure moves to `Error` with the
    /// service's detail message.
    pub async fn sign(&mut self) -> Result<SignedPayload, AppError> {
        self.ensure(WorkflowState::ReadyToSign, "sign")?;
        let content = self.content.clone().ok_or_else(|| {
            AppError::MissingPrerequisite("Upload the file before signing".to_string())
        })?;
        let summary = self.summary.unwrap_or_default();

        self.transition(WorkflowState::Signing);
        match self
            .ledger
            .sign_payload(&content.ipfs_cid, &summary.to_summary_text())
            .await
        {
            Ok(payload) => {
                let cached = CachedSignature {
                    content,
                    payload: payload.clone(),
                    file_name: self.file_name.clone().unwrap_or_default(),
                    summary,
                    meta: self.meta.clone(),
                };
                if let Err(e) = self.session.set_json(SIGNED_PAYLOAD_KEY, &cached) {
                    tracing::warn!(error = %e, "Failed to cache signed payload");
                }
                self.signed = Some(payload.clone());
                self.transition(WorkflowState::ReadyToSubmit);
                Ok(payload)
            }
            Err(e) => {
                let err = AppError::Signing(e);
                self.fail(FailedStep::Signing, &err);
                Err(err)
            }
        }
    }

    /// ReadyToSubmit → Submitting → Success. On success all intermediate
    /// state, including the session cache, is cleared.
    pub async fn submit(
        &mut self,
        signature: Option<String>,
    ) -> Result<SubmissionRecord, AppError> {
        self.ensure(WorkflowState::ReadyToSubmit, "submit")?;
        let content = self.content.clone().ok_or_else(|| {
            AppError::MissingPrerequisite("No content reference for submission".to_string())
        })?;
        let payload = self.signed.clone().ok_or_else(|| {
            AppError::MissingPrerequisite("Sign the payload before submitting".to_string())
        })?;
        let summary = self.summary.unwrap_or_default();
        let file_name = self.file_name.clone().unwrap_or_default();

        let request = SubmitInspectionRequest {
            payload: payload.clone(),
            signature,
            meta: SubmissionMeta {
                ipfs_cid: content.ipfs_cid.clone(),
                file_name: file_name.clone(),
                summary,
                inspection: self.meta.clone(),
            },
        };

        self.transition(WorkflowState::Submitting);
        match self.ledger.submit_inspection(&request).await {
            Ok(receipt) => {
                if let Err(e) = self.session.remove(SIGNED_PAYLOAD_KEY) {
                    tracing::error!(error = %e, "Failed to clear cached signed payload");
                }
                let record = SubmissionRecord {
                    file_name,
                    meta: std::mem::take(&mut self.meta),
                    summary,
                    content,
                    payload,
                    receipt,
                };
                self.file = None;
                self.results.clear();
                self.content = None;
                self.signed = None;
                self.failure = None;
                self.completed = Some(record.clone());
                self.transition(WorkflowState::Success);
                Ok(record)
            }
            Err(e) => {
                let err = AppError::Submission(e);
                self.fail(FailedStep::Submitting, &err);
                Err(err)
            }
        }
    }

    /// Error → the state that initiated the failed call.
    pub fn retry(&mut self) -> Result<WorkflowState, AppError> {
        if self.state != WorkflowState::Error {
            return Err(AppError::InvalidTransition {
                from: self.state.to_string(),
                action: "retry",
            });
        }
        let origin = self
            .failure
            .take()
            .map(|f| f.step.origin())
            .unwrap_or(WorkflowState::Form);
        self.transition(origin);
        Ok(origin)
    }

    /// Back to `Form`, discarding everything including the session cache.
    pub fn abandon(&mut self) -> Result<(), AppError> {
        self.file = None;
        self.file_name = None;
        self.meta = InspectionMeta::default();
        self.results.clear();
        self.summary = None;
        self.content = None;
        self.signed = None;
        self.failure = None;
        self.completed = None;
        self.transition(WorkflowState::Form);
        self.session.remove(SIGNED_PAYLOAD_KEY)
    }
}
