//! Ledger service request/response types: content upload, signing,
//! submission and certificates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::AnalysisSummary;

/// Where an uploaded file landed on the content-addressed network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentReference {
    pub ipfs_cid: String,
    pub content_hash: String,
}

/// Payload produced by the signing endpoint, attesting an inspector to a content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPayload {
    pub contract_address: String,
    pub chain_id: u64,
    pub content_hash: String,
    pub summary_hash: String,
    /// Inspector address
    pub inspector: String,
    /// Unix seconds
    pub inspector_timestamp: i64,
    pub nonce: String,
}

/// Descriptive fields the inspector enters with the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionMeta {
    pub ipfs_cid: String,
    pub file_name: String,
    pub summary: AnalysisSummary,
    #[serde(flatten)]
    pub inspection: InspectionMeta,
}

/// JSON body of `POST /submit-inspection`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitInspectionRequest {
    pub payload: SignedPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub meta: SubmissionMeta,
}

/// Confirmation returned by `POST /submit-inspection`. Only the common fields
/// are typed; anything else the service sends is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, alias = "tx", skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedCertificate {
    pub cert_id: String,
    pub cert_hash: String,
    pub owner: String,
    /// Unix seconds
    pub expiry: i64,
    pub tx_hash: String,
}

/// Response body of `POST /issue_certificate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCertificateResponse {
    pub status: String,
    pub message: String,
    pub data: IssuedCertificate,
}

/// Response body of `POST /revoke-certificate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeResponse {
    #[serde(alias = "tx_hash")]
    pub tx: String,
}
