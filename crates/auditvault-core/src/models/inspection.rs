//! Inspection records shown on the role dashboards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionStatus {
    Pending,
    Approved,
    Rejected,
    FinalApproved,
}

impl Display for InspectionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            InspectionStatus::Pending => write!(f, "pending"),
            InspectionStatus::Approved => write!(f, "approved"),
            InspectionStatus::Rejected => write!(f, "rejected"),
            InspectionStatus::FinalApproved => write!(f, "final_approved"),
        }
    }
}

/// A manager or auditor decision as recorded on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub approved: bool,
    pub address: String,
    pub timestamp: DateTime<Utc>,
    pub tx_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionRecord {
    pub id: String,
    pub site_id: String,
    pub location: String,
    pub inspector_address: String,
    pub inspector_name: String,
    /// Out of 10
    pub compliance_score: f64,
    pub status: InspectionStatus,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub critical_issues: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipfs_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_approval: Option<Approval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auditor_approval: Option<Approval>,
}

/// Partial update applied by [`InspectionRecord::apply`]; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct InspectionPatch {
    pub status: Option<InspectionStatus>,
    pub compliance_score: Option<f64>,
    pub ipfs_hash: Option<String>,
    pub transaction_hash: Option<String>,
    pub manager_approval: Option<Approval>,
    pub auditor_approval: Option<Approval>,
}

impl InspectionRecord {
    pub fn apply(&mut self, patch: InspectionPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(score) = patch.compliance_score {
            self.compliance_score = score;
        }
        if let Some(hash) = patch.ipfs_hash {
            self.ipfs_hash = Some(hash);
        }
        if let Some(hash) = patch.transaction_hash {
            self.transaction_hash = Some(hash);
        }
        if let Some(approval) = patch.manager_approval {
            self.manager_approval = Some(approval);
        }
        if let Some(approval) = patch.auditor_approval {
            self.auditor_approval = Some(approval);
        }
    }

    /// Scores below 6 count as critical.
    pub fn is_critical(&self) -> bool {
        self.compliance_score < 6.0
    }
}
