//! Upload history entries kept in local storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SignedPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStatus {
    Signed,
    Pending,
    Rejected,
}

impl HistoryStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            HistoryStatus::Signed => "Approved",
            HistoryStatus::Pending => "Pending",
            HistoryStatus::Rejected => "Rejected",
        }
    }

    pub fn certificate_available(&self) -> bool {
        matches!(self, HistoryStatus::Signed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHistory {
    pub id: String,
    #[serde(rename = "ipfs_cid")]
    pub ipfs_cid: String,
    pub document_name: String,
    pub status: HistoryStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SignedPayload>,
}
