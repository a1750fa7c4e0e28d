//! Contracts for the external collaborators
//!
//! The analysis service and the ledger service are reached over HTTP by
//! `auditvault-api-client`; the workflow and dashboards only see these traits.
//! Every method is a single request/response with no implicit retry.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{
    ActivityResponse, AnalysisResponse, Approval, ContentReference, IssueCertificateResponse,
    RevokeResponse, SignedPayload, SubmissionReceipt, SubmitInspectionRequest, UploadedFile,
};

/// Forgery analysis of a single file.
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    async fn analyze(&self, file: &UploadedFile) -> Result<AnalysisResponse, ApiError>;
}

/// Content storage, signing, submission, certificates and activity feed.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Store the file on the content network.
    async fn upload_file(&self, file: &UploadedFile) -> Result<ContentReference, ApiError>;

    /// Ask the service to build a payload for the inspector to sign.
    async fn sign_payload(
        &self,
        ipfs_cid: &str,
        summary_text: &str,
    ) -> Result<SignedPayload, ApiError>;

    async fn submit_inspection(
        &self,
        request: &SubmitInspectionRequest,
    ) -> Result<SubmissionReceipt, ApiError>;

    async fn issue_certificate(
        &self,
        file: &UploadedFile,
    ) -> Result<IssueCertificateResponse, ApiError>;

    async fn revoke_certificate(&self, cert_hash: &str) -> Result<RevokeResponse, ApiError>;

    async fn fetch_recent_activity(&self, limit: u32) -> Result<ActivityResponse, ApiError>;
}

/// Records manager and auditor decisions on the ledger.
#[async_trait]
pub trait ApprovalLedger: Send + Sync {
    async fn record_manager_decision(
        &self,
        record_id: &str,
        manager_address: &str,
        approved: bool,
    ) -> Result<Approval, ApiError>;

    async fn record_audit_approval(
        &self,
        record_id: &str,
        auditor_address: &str,
    ) -> Result<Approval, ApiError>;
}
