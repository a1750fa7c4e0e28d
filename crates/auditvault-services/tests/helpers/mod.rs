#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use auditvault_core::models::{
    ActivityItem, ActivityResponse, AnalysisResponse, AnalysisResult, AnalysisSummary,
    ContentReference, FinalLabel, IssueCertificateResponse, IssuedCertificate, RevokeResponse,
    SignedPayload, SubmissionReceipt, SubmitInspectionRequest, UploadedFile,
};
use auditvault_core::{AnalysisGateway, ApiError, LedgerGateway};
use auditvault_services::{KeyValueStore, MemoryStore, SubmissionWorkflow};

pub fn service_error(detail: &str) -> ApiError {
    ApiError::Service {
        status: 400,
        detail: Some(detail.to_string()),
        body: format!(r#"{{"detail":"{}"}}"#, detail),
    }
}

pub fn result(label: FinalLabel) -> AnalysisResult {
    AnalysisResult {
        file_label: "page".to_string(),
        confidence: 0.9,
        probability_fake: if label == FinalLabel::Real { 0.05 } else { 0.95 },
        final_label: label,
    }
}

pub fn sample_file() -> UploadedFile {
    UploadedFile::new("site-report.pdf", b"%PDF-1.4 inspection".to_vec())
}

pub fn signed_payload(ipfs_cid: &str) -> SignedPayload {
    SignedPayload {
        contract_address: "0xc0ffee".to_string(),
        chain_id: 80001,
        content_hash: "0xabc".to_string(),
        summary_hash: format!("0xsummary-{}", ipfs_cid),
        inspector: "0x1234".to_string(),
        inspector_timestamp: 1_700_000_000,
        nonce: "1".to_string(),
    }
}

/// Analysis double returning a fixed response.
pub struct FakeAnalysis {
    pub response: Mutex<Result<AnalysisResponse, ApiError>>,
    pub calls: AtomicUsize,
}

impl FakeAnalysis {
    pub fn with_summary(real: u32, fake: u32, total: u32) -> Arc<Self> {
        let mut results = Vec::new();
        results.extend((0..real).map(|_| result(FinalLabel::Real)));
        results.extend((0..fake).map(|_| result(FinalLabel::Forged)));
        Arc::new(Self {
            response: Mutex::new(Ok(AnalysisResponse {
                status: "ok".to_string(),
                count: total,
                results,
                summary: Some(AnalysisSummary { real, fake, total }),
            })),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(err: ApiError) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Err(err)),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisGateway for FakeAnalysis {
    async fn analyze(&self, _file: &UploadedFile) -> Result<AnalysisResponse, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.lock().unwrap().clone()
    }
}

/// Ledger double that counts calls and records the arguments it saw.
#[derive(Default)]
pub struct FakeLedger {
    pub uploads: AtomicUsize,
    pub signs: AtomicUsize,
    pub submits: AtomicUsize,
    pub sign_args: Mutex<Vec<(String, String)>>,
    pub submitted: Mutex<Vec<SubmitInspectionRequest>>,
    pub fail_upload: Mutex<Option<ApiError>>,
    pub fail_sign: Mutex<Option<ApiError>>,
    pub fail_submit: Mutex<Option<ApiError>>,
    pub activity: Mutex<Vec<ActivityItem>>,
}

impl FakeLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn network_calls(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
            + self.signs.load(Ordering::SeqCst)
            + self.submits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerGateway for FakeLedger {
    async fn upload_file(&self, _file: &UploadedFile) -> Result<ContentReference, ApiError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_upload.lock().unwrap().take() {
            return Err(err);
        }
        Ok(ContentReference {
            ipfs_cid: "Qm123".to_string(),
            content_hash: "0xabc".to_string(),
        })
    }

    async fn sign_payload(
        &self,
        ipfs_cid: &str,
        summary_text: &str,
    ) -> Result<SignedPayload, ApiError> {
        self.signs.fetch_add(1, Ordering::SeqCst);
        self.sign_args
            .lock()
            .unwrap()
            .push((ipfs_cid.to_string(), summary_text.to_string()));
        if let Some(err) = self.fail_sign.lock().unwrap().take() {
            return Err(err);
        }
        Ok(signed_payload(ipfs_cid))
    }

    async fn submit_inspection(
        &self,
        request: &SubmitInspectionRequest,
    ) -> Result<SubmissionReceipt, ApiError> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_submit.lock().unwrap().take() {
            return Err(err);
        }
        self.submitted.lock().unwrap().push(request.clone());
        Ok(SubmissionReceipt {
            status: Some("submitted".to_string()),
            tx_hash: Some("0xfeed".to_string()),
            ..Default::default()
        })
    }

    async fn issue_certificate(
        &self,
        _file: &UploadedFile,
    ) -> Result<IssueCertificateResponse, ApiError> {
        Ok(IssueCertificateResponse {
            status: "success".to_string(),
            message: "issued".to_string(),
            data: IssuedCertificate {
                cert_id: "1".to_string(),
                cert_hash: "0xcert".to_string(),
                owner: "0x1234".to_string(),
                expiry: 1_800_000_000,
                tx_hash: "0xtx".to_string(),
            },
        })
    }

    async fn revoke_certificate(&self, _cert_hash: &str) -> Result<RevokeResponse, ApiError> {
        Ok(RevokeResponse {
            tx: "0xrevoked".to_string(),
        })
    }

    async fn fetch_recent_activity(&self, limit: u32) -> Result<ActivityResponse, ApiError> {
        let items: Vec<ActivityItem> = self
            .activity
            .lock()
            .unwrap()
            .iter()
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(ActivityResponse {
            count: items.len() as u32,
            items,
        })
    }
}

pub struct Harness {
    pub analysis: Arc<FakeAnalysis>,
    pub ledger: Arc<FakeLedger>,
    pub session: Arc<dyn KeyValueStore>,
}

impl Harness {
    pub fn new(analysis: Arc<FakeAnalysis>) -> Self {
        Self {
            analysis,
            ledger: FakeLedger::new(),
            session: Arc::new(MemoryStore::new()),
        }
    }

    pub fn workflow(&self) -> SubmissionWorkflow {
        SubmissionWorkflow::new(
            self.analysis.clone(),
            self.ledger.clone(),
            self.session.clone(),
        )
    }

    pub fn restored(&self) -> SubmissionWorkflow {
        SubmissionWorkflow::restore(
            self.analysis.clone(),
            self.ledger.clone(),
            self.session.clone(),
        )
        .expect("restore workflow")
    }
}
