//! Ledger service client: content upload, payload signing, inspection
//! submission, certificates and the recent-activity feed.

use async_trait::async_trait;
use auditvault_core::models::{
    ActivityResponse, ContentReference, IssueCertificateResponse, RevokeResponse, SignedPayload,
    SubmissionReceipt, SubmitInspectionRequest, UploadedFile,
};
use auditvault_core::{ApiError, LedgerGateway};

use crate::{file_form, ApiClient};

const UPLOAD_PATH: &str = "/upload";
const SIGN_PAYLOAD_PATH: &str = "/sign-payload";
const SUBMIT_INSPECTION_PATH: &str = "/submit-inspection";
const ISSUE_CERTIFICATE_PATH: &str = "/issue_certificate";
const REVOKE_CERTIFICATE_PATH: &str = "/revoke-certificate";
const RECENT_ACTIVITY_PATH: &str = "/activity/recent";

#[derive(Clone, Debug)]
pub struct LedgerClient {
    api: ApiClient,
}

impl LedgerClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

#[async_trait]
impl LedgerGateway for LedgerClient {
    async fn upload_file(&self, file: &UploadedFile) -> Result<ContentReference, ApiError> {
        tracing::debug!(file = %file.name(), "Uploading file to content network");
        self.api.post_multipart(UPLOAD_PATH, file_form(file)).await
    }

    async fn sign_payload(
        &self,
        ipfs_cid: &str,
        summary_text: &str,
    ) -> Result<SignedPayload, ApiError> {
        tracing::debug!(ipfs_cid = %ipfs_cid, "Requesting signed payload");
        self.api
            .post_query(
                SIGN_PAYLOAD_PATH,
                &[
                    ("ipfs_cid", ipfs_cid.to_string()),
                    ("summary", summary_text.to_string()),
                ],
            )
            .await
    }

    async fn submit_inspection(
        &self,
        request: &SubmitInspectionRequest,
    ) -> Result<SubmissionReceipt, ApiError> {
        tracing::debug!(ipfs_cid = %request.meta.ipfs_cid, "Submitting inspection");
        self.api.post_json(SUBMIT_INSPECTION_PATH, request).await
    }

    async fn issue_certificate(
        &self,
        file: &UploadedFile,
    ) -> Result<IssueCertificateResponse, ApiError> {
        tracing::debug!(file = %file.name(), "Issuing certificate");
        self.api
            .post_multipart(ISSUE_CERTIFICATE_PATH, file_form(file))
            .await
    }

    async fn revoke_certificate(&self, cert_hash: &str) -> Result<RevokeResponse, ApiError> {
        tracing::debug!(cert_hash = %cert_hash, "Revoking certificate");
        self.api
            .post_query(
                REVOKE_CERTIFICATE_PATH,
                &[("cert_hash", cert_hash.to_string())],
            )
            .await
    }

    async fn fetch_recent_activity(&self, limit: u32) -> Result<ActivityResponse, ApiError> {
        self.api
            .get(
                RECENT_ACTIVITY_PATH,
                &[
                    ("limit", limit.to_string()),
                    ("include_onchain", "true".to_string()),
                ],
            )
            .await
    }
}
