//! Role dashboards over the shared [`InspectionStore`].
//!
//! Managers approve or reject pending inspections, auditors give final
//! approval to manager-approved ones, and regulators get a read-only summary.
//! Every decision is acknowledged by an [`ApprovalLedger`] before the record
//! changes.

use std::sync::Arc;

use async_trait::async_trait;
use auditvault_core::constants::verification_link;
use auditvault_core::models::{
    Approval, InspectionPatch, InspectionRecord, InspectionStatus, UserRole,
};
use auditvault_core::{ApiError, AppError, ApprovalLedger};
use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::export::{self, ExportSummary};
use crate::inspections::InspectionStore;
use crate::notifications::{NotificationCenter, NotificationKind};

/// Ledger stand-in that shapes approval acknowledgements without a chain.
///
/// Transaction hashes are `sha256(kind | record id | actor | timestamp)`.
#[derive(Debug, Clone, Default)]
pub struct HashingApprovalLedger;

impl HashingApprovalLedger {
    fn acknowledge(&self, kind: &str, record_id: &str, actor: &str, approved: bool) -> Approval {
        let timestamp = Utc::now();
        let mut hasher = Sha256::new();
        hasher.update(kind.as_bytes());
        hasher.update(b"|");
        hasher.update(record_id.as_bytes());
        hasher.update(b"|");
        hasher.update(actor.as_bytes());
        hasher.update(b"|");
        hasher.update(timestamp.timestamp_millis().to_be_bytes());
        let tx_hash = format!("0x{}", hex::encode(hasher.finalize()));

        tracing::debug!(kind, record_id, tx_hash = %tx_hash, "Approval acknowledged");
        Approval {
            approved,
            address: actor.to_string(),
            timestamp,
            tx_hash,
        }
    }
}

#[async_trait]
impl ApprovalLedger for HashingApprovalLedger {
    async fn record_manager_decision(
        &self,
        record_id: &str,
        manager_address: &str,
        approved: bool,
    ) -> Result<Approval, ApiError> {
        Ok(self.acknowledge("manager", record_id, manager_address, approved))
    }

    async fn record_audit_approval(
        &self,
        record_id: &str,
        auditor_address: &str,
    ) -> Result<Approval, ApiError> {
        Ok(self.acknowledge("auditor", record_id, auditor_address, true))
    }
}

fn require_status(
    record: &InspectionRecord,
    expected: InspectionStatus,
    action: &'static str,
) -> Result<(), AppError> {
    if record.status == expected {
        Ok(())
    } else {
        Err(AppError::InvalidTransition {
            from: record.status.to_string(),
            action,
        })
    }
}

pub struct ManagerDashboard {
    inspections: Arc<InspectionStore>,
    ledger: Arc<dyn ApprovalLedger>,
    notifications: NotificationCenter,
    manager_address: String,
}

impl ManagerDashboard {
    pub fn new(
        inspections: Arc<InspectionStore>,
        ledger: Arc<dyn ApprovalLedger>,
        notifications: NotificationCenter,
        manager_address: impl Into<String>,
    ) -> Self {
        Self {
            inspections,
            ledger,
            notifications,
            manager_address: manager_address.into(),
        }
    }

    pub fn queue(&self) -> Vec<InspectionRecord> {
        self.inspections.by_role(UserRole::Manager, None)
    }

    pub async fn approve(&self, id: &str) -> Result<InspectionRecord, AppError> {
        self.decide(id, true).await
    }

    pub async fn reject(&self, id: &str) -> Result<InspectionRecord, AppError> {
        self.decide(id, false).await
    }

    async fn decide(&self, id: &str, approved: bool) -> Result<InspectionRecord, AppError> {
        let record = self
            .inspections
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Inspection {} not found", id)))?;
        require_status(
            &record,
            InspectionStatus::Pending,
            if approved { "approve" } else { "reject" },
        )?;

        let approval = match self
            .ledger
            .record_manager_decision(id, &self.manager_address, approved)
            .await
        {
            Ok(approval) => approval,
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "Manager decision not recorded");
                self.notifications.add(
                    NotificationKind::Error,
                    "Approval Failed",
                    "Failed to record approval on blockchain",
                );
                return Err(AppError::Approval(e));
            }
        };

        let tx_hash = approval.tx_hash.clone();
        let status = if approved {
            InspectionStatus::Approved
        } else {
            InspectionStatus::Rejected
        };
        let updated = self.inspections.update(
            id,
            InspectionPatch {
                status: Some(status),
                manager_approval: Some(approval),
                ..Default::default()
            },
        )?;

        if approved {
            self.notifications.add_with_action(
                NotificationKind::Success,
                "Approval Recorded",
                "Inspection approval has been recorded on blockchain",
                Some(verification_link(&tx_hash)),
            );
        } else {
            self.notifications.add(
                NotificationKind::Warning,
                "Inspection Rejected",
                format!("Inspection {} was rejected", updated.site_id),
            );
        }
        Ok(updated)
    }
}

pub struct AuditorDashboard {
    inspections: Arc<InspectionStore>,
    ledger: Arc<dyn ApprovalLedger>,
    notifications: NotificationCenter,
    auditor_address: String,
}

impl AuditorDashboard {
    pub fn new(
        inspections: Arc<InspectionStore>,
        ledger: Arc<dyn ApprovalLedger>,
        notifications: NotificationCenter,
        auditor_address: impl Into<String>,
    ) -> Self {
        Self {
            inspections,
            ledger,
            notifications,
            auditor_address: auditor_address.into(),
        }
    }

    pub fn queue(&self) -> Vec<InspectionRecord> {
        self.inspections.by_role(UserRole::Auditor, None)
    }

    /// Only manager-approved records can be finally approved.
    pub async fn final_approve(&self, id: &str) -> Result<InspectionRecord, AppError> {
        let record = self
            .inspections
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Inspection {} not found", id)))?;
        require_status(&record, InspectionStatus::Approved, "final-approve")?;

        let approval = self
            .ledger
            .record_audit_approval(id, &self.auditor_address)
            .await
            .map_err(|e| {
                tracing::warn!(id = %id, error = %e, "Audit approval not recorded");
                self.notifications.add(
                    NotificationKind::Error,
                    "Approval Failed",
                    "Failed to record audit approval",
                );
                AppError::Approval(e)
            })?;

        let tx_hash = approval.tx_hash.clone();
        let updated = self.inspections.update(
            id,
            InspectionPatch {
                status: Some(InspectionStatus::FinalApproved),
                auditor_approval: Some(approval),
                ..Default::default()
            },
        )?;

        self.notifications.add_with_action(
            NotificationKind::Success,
            "Audit Approved",
            format!("Final approval recorded for {}", updated.site_id),
            Some(verification_link(&tx_hash)),
        );
        Ok(updated)
    }

    /// Reject a manager-approved record without a ledger entry.
    pub fn reject(&self, id: &str) -> Result<InspectionRecord, AppError> {
        let record = self
            .inspections
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Inspection {} not found", id)))?;
        require_status(&record, InspectionStatus::Approved, "reject")?;

        let updated = self.inspections.update(
            id,
            InspectionPatch {
                status: Some(InspectionStatus::Rejected),
                ..Default::default()
            },
        )?;
        self.notifications.add(
            NotificationKind::Warning,
            "Audit Rejected",
            format!("Inspection {} was rejected at audit", updated.site_id),
        );
        Ok(updated)
    }
}

pub struct RegulatorDashboard {
    inspections: Arc<InspectionStore>,
}

impl RegulatorDashboard {
    pub fn new(inspections: Arc<InspectionStore>) -> Self {
        Self { inspections }
    }

    pub fn records(&self) -> Vec<InspectionRecord> {
        self.inspections.by_role(UserRole::Regulator, None)
    }

    pub fn summary(&self) -> ExportSummary {
        export::summary(&self.records())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::time::Duration;

    struct FailingLedger;

    #[async_trait]
    impl ApprovalLedger for FailingLedger {
        async fn record_manager_decision(
            &self,
            _record_id: &str,
            _manager_address: &str,
            _approved: bool,
        ) -> Result<Approval, ApiError> {
            Err(ApiError::Network("unreachable".into()))
        }

        async fn record_audit_approval(
            &self,
            _record_id: &str,
            _auditor_address: &str,
        ) -> Result<Approval, ApiError> {
            Err(ApiError::Network("unreachable".into()))
        }
    }

    fn setup() -> (Arc<InspectionStore>, NotificationCenter) {
        let store = InspectionStore::load(Arc::new(MemoryStore::new())).unwrap();
        (Arc::new(store), NotificationCenter::new(Duration::from_secs(5)))
    }

    #[tokio::test]
    async fn manager_then_auditor_approval() {
        let (store, notes) = setup();
        let ledger: Arc<dyn ApprovalLedger> = Arc::new(HashingApprovalLedger);
        let manager =
            ManagerDashboard::new(store.clone(), ledger.clone(), notes.clone(), "0x9876");
        let auditor = AuditorDashboard::new(store.clone(), ledger, notes.clone(), "0xabcd");

        let approved = manager.approve("1").await.unwrap();
        assert_eq!(approved.status, InspectionStatus::Approved);
        let approval = approved.manager_approval.unwrap();
        assert!(approval.approved);
        assert!(approval.tx_hash.starts_with("0x"));
        assert_eq!(approval.tx_hash.len(), 66);

        let done = auditor.final_approve("1").await.unwrap();
        assert_eq!(done.status, InspectionStatus::FinalApproved);
        assert_eq!(done.auditor_approval.unwrap().address, "0xabcd");

        let list = notes.list();
        assert_eq!(list.len(), 2);
        assert!(list[0]
            .action_url
            .as_deref()
            .unwrap()
            .starts_with("https://mumbai.polygonscan.com/tx/0x"));
    }

    #[tokio::test]
    async fn final_approve_requires_manager_approval() {
        let (store, notes) = setup();
        let ledger = Arc::new(HashingApprovalLedger);
        let auditor = AuditorDashboard::new(store.clone(), ledger, notes, "0xa");

        let err = auditor.final_approve("2").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
        assert_eq!(store.get("2").unwrap().status, InspectionStatus::Pending);
    }

    #[tokio::test]
    async fn reject_notifies_with_warning() {
        let (store, notes) = setup();
        let ledger = Arc::new(HashingApprovalLedger);
        let manager = ManagerDashboard::new(store.clone(), ledger, notes.clone(), "0x9");

        let rejected = manager.reject("2").await.unwrap();
        assert_eq!(rejected.status, InspectionStatus::Rejected);
        assert!(!rejected.manager_approval.unwrap().approved);
        assert_eq!(notes.list()[0].kind, NotificationKind::Warning);
    }

    #[tokio::test]
    async fn ledger_failure_leaves_record_untouched() {
        let (store, notes) = setup();
        let ledger = Arc::new(FailingLedger);
        let manager = ManagerDashboard::new(store.clone(), ledger, notes.clone(), "0x9");

        let err = manager.approve("1").await.unwrap_err();
        assert!(matches!(err, AppError::Approval(_)));
        assert_eq!(store.get("1").unwrap().status, InspectionStatus::Pending);
        assert_eq!(notes.list()[0].kind, NotificationKind::Error);
    }

    #[test]
    fn regulator_summary_covers_all_records() {
        let (store, _) = setup();
        let summary = RegulatorDashboard::new(store).summary();
        assert_eq!(summary.total_records, 4);
        assert_eq!(summary.pending, 2);
        assert_eq!(summary.critical_issues, 1);
    }
}
