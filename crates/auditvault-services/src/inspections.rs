//! Inspection records shared by the role dashboards, persisted under `inspectionRecords`.

use std::sync::{Arc, RwLock};

use auditvault_core::constants::INSPECTIONS_KEY;
use auditvault_core::models::{InspectionPatch, InspectionRecord, InspectionStatus, UserRole};
use auditvault_core::AppError;
use chrono::{TimeZone, Utc};

use crate::storage::{KeyValueStore, KeyValueStoreExt};
use crate::workflow::SubmissionRecord;

pub struct InspectionStore {
    store: Arc<dyn KeyValueStore>,
    records: RwLock<Vec<InspectionRecord>>,
}

impl InspectionStore {
    /// Load persisted records. When nothing was ever stored the demo records are used.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, AppError> {
        let records = match store.get_json::<Vec<InspectionRecord>>(INSPECTIONS_KEY) {
            Ok(Some(records)) => records,
            Ok(None) => demo_records(),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable inspection records");
                store.remove(INSPECTIONS_KEY)?;
                Vec::new()
            }
        };
        Ok(Self {
            store,
            records: RwLock::new(records),
        })
    }

    /// Empty store that is still persisted on change.
    pub fn empty(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            records: RwLock::new(Vec::new()),
        }
    }

    fn with_records<T>(
        &self,
        f: impl FnOnce(&mut Vec<InspectionRecord>) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| AppError::Storage("inspection lock poisoned".to_string()))?;
        // Visible only once persisted.
        let mut next = records.clone();
        let out = f(&mut next)?;
        self.store.set_json(INSPECTIONS_KEY, &next)?;
        *records = next;
        Ok(out)
    }

    pub fn all(&self) -> Vec<InspectionRecord> {
        self.records.read().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn add(&self, record: InspectionRecord) -> Result<(), AppError> {
        tracing::info!(id = %record.id, site_id = %record.site_id, "Inspection added");
        self.with_records(|records| {
            records.push(record);
            Ok(())
        })
    }

    pub fn update(&self, id: &str, patch: InspectionPatch) -> Result<InspectionRecord, AppError> {
        let updated = self.with_records(|records| {
            let record = records
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Inspection {} not found", id)))?;
            record.apply(patch);
            Ok(record.clone())
        })?;
        tracing::info!(id = %id, status = %updated.status, "Inspection updated");
        Ok(updated)
    }

    pub fn get(&self, id: &str) -> Option<InspectionRecord> {
        self.records
            .read()
            .ok()
            .and_then(|r| r.iter().find(|i| i.id == id).cloned())
    }

    /// Records visible to `role`. Inspectors only see their own.
    pub fn by_role(&self, role: UserRole, user_address: Option<&str>) -> Vec<InspectionRecord> {
        let records = self.all();
        match role {
            UserRole::Inspector => records
                .into_iter()
                .filter(|r| Some(r.inspector_address.as_str()) == user_address)
                .collect(),
            UserRole::Manager => records
                .into_iter()
                .filter(|r| r.status == InspectionStatus::Pending)
                .collect(),
            UserRole::Auditor => records
                .into_iter()
                .filter(|r| r.status == InspectionStatus::Approved)
                .collect(),
            UserRole::Regulator => records,
        }
    }
}

/// Pending record for a completed submission. The score is the share of
/// results labelled Real, out of 10.
pub fn record_from_submission(
    submission: &SubmissionRecord,
    inspector_address: &str,
    inspector_name: &str,
) -> InspectionRecord {
    let summary = submission.summary;
    let score = if summary.total == 0 {
        0.0
    } else {
        (summary.real as f64 / summary.total as f64 * 100.0).round() / 10.0
    };
    let mut warnings = Vec::new();
    if summary.has_suspect() {
        warnings.push(format!(
            "{} of {} analysed items were not classified as real",
            summary.not_real(),
            summary.total
        ));
    }

    InspectionRecord {
        id: uuid::Uuid::new_v4().to_string(),
        site_id: submission
            .meta
            .site_id
            .clone()
            .unwrap_or_else(|| submission.file_name.clone()),
        location: submission.meta.location.clone().unwrap_or_default(),
        inspector_address: inspector_address.to_string(),
        inspector_name: inspector_name.to_string(),
        compliance_score: score,
        status: InspectionStatus::Pending,
        warnings,
        critical_issues: Vec::new(),
        recommendations: Vec::new(),
        timestamp: Utc::now(),
        ipfs_hash: Some(submission.content.ipfs_cid.clone()),
        transaction_hash: submission.receipt.tx_hash.clone(),
        manager_approval: None,
        auditor_approval: None,
    }
}

fn demo_records() -> Vec<InspectionRecord> {
    let record = |id: &str,
                  site_id: &str,
                  location: &str,
                  inspector: &str,
                  score: f64,
                  status: InspectionStatus,
                  day: u32| InspectionRecord {
        id: id.to_string(),
        site_id: site_id.to_string(),
        location: location.to_string(),
        inspector_address: inspector.to_string(),
        inspector_name: "John Inspector".to_string(),
        compliance_score: score,
        status,
        warnings: Vec::new(),
        critical_issues: Vec::new(),
        recommendations: Vec::new(),
        timestamp: Utc
            .with_ymd_and_hms(2025, 1, day, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now),
        ipfs_hash: None,
        transaction_hash: None,
        manager_approval: None,
        auditor_approval: None,
    };

    vec![
        record(
            "1",
            "SITE-A1B2C3",
            "Downtown Construction Site",
            "0x1234...5678",
            8.5,
            InspectionStatus::Pending,
            6,
        ),
        record(
            "2",
            "SITE-D4E5F6",
            "Industrial Facility B",
            "0x1234...5678",
            7.2,
            InspectionStatus::Pending,
            5,
        ),
        record(
            "3",
            "SITE-G7H8I9",
            "Office Building C",
            "0x3Qw9Rt...xY2Z",
            9.1,
            InspectionStatus::Approved,
            4,
        ),
        record(
            "4",
            "SITE-J1K2L3",
            "Factory Complex",
            "0x7Ab3Cd...eF4G",
            5.8,
            InspectionStatus::Rejected,
            3,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn fresh_store_has_demo_records() {
        let store = InspectionStore::load(Arc::new(MemoryStore::new())).unwrap();
        assert_eq!(store.all().len(), 4);
        assert_eq!(store.by_role(UserRole::Manager, None).len(), 2);
        assert_eq!(store.by_role(UserRole::Auditor, None).len(), 1);
        assert_eq!(store.by_role(UserRole::Regulator, None).len(), 4);
        assert_eq!(
            store
                .by_role(UserRole::Inspector, Some("0x1234...5678"))
                .len(),
            2
        );
        assert!(store.by_role(UserRole::Inspector, None).is_empty());
    }

    #[test]
    fn update_persists() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let store = InspectionStore::load(kv.clone()).unwrap();
        store
            .update(
                "1",
                InspectionPatch {
                    status: Some(InspectionStatus::Approved),
                    ..Default::default()
                },
            )
            .unwrap();

        let reloaded = InspectionStore::load(kv).unwrap();
        assert_eq!(
            reloaded.get("1").unwrap().status,
            InspectionStatus::Approved
        );
    }

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, AppError> {
            Ok(None)
        }
        fn set(&self, _key: &str, _value: String) -> Result<(), AppError> {
            Err(AppError::Storage("disk full".into()))
        }
        fn remove(&self, _key: &str) -> Result<(), AppError> {
            Ok(())
        }
        fn clear(&self) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[test]
    fn failed_write_leaves_records_unchanged() {
        let store = InspectionStore::load(Arc::new(ReadOnlyStore)).unwrap();
        let err = store
            .update(
                "1",
                InspectionPatch {
                    status: Some(InspectionStatus::Approved),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(store.get("1").unwrap().status, InspectionStatus::Pending);
        assert_eq!(store.by_role(UserRole::Manager, None).len(), 2);

        let record = store.get("3").unwrap();
        assert!(store.add(record).is_err());
        assert_eq!(store.all().len(), 4);
    }

    #[test]
    fn submission_becomes_pending_record() {
        use auditvault_core::models::{
            AnalysisSummary, ContentReference, InspectionMeta, SignedPayload, SubmissionReceipt,
        };

        let submission = SubmissionRecord {
            file_name: "site.pdf".into(),
            meta: InspectionMeta {
                site_id: Some("SITE-9".into()),
                location: Some("Pier 4".into()),
            },
            summary: AnalysisSummary {
                real: 3,
                fake: 1,
                total: 4,
            },
            content: ContentReference {
                ipfs_cid: "Qm123".into(),
                content_hash: "0xabc".into(),
            },
            payload: SignedPayload {
                contract_address: "0xc0".into(),
                chain_id: 1,
                content_hash: "0xabc".into(),
                summary_hash: "0xdef".into(),
                inspector: "0x12".into(),
                inspector_timestamp: 0,
                nonce: "0".into(),
            },
            receipt: SubmissionReceipt {
                tx_hash: Some("0xfeed".into()),
                ..Default::default()
            },
        };

        let record = record_from_submission(&submission, "0x12", "John Inspector");
        assert_eq!(record.site_id, "SITE-9");
        assert_eq!(record.compliance_score, 7.5);
        assert_eq!(record.status, InspectionStatus::Pending);
        assert_eq!(record.ipfs_hash.as_deref(), Some("Qm123"));
        assert_eq!(record.transaction_hash.as_deref(), Some("0xfeed"));
        assert_eq!(record.warnings.len(), 1);
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let store = InspectionStore::empty(Arc::new(MemoryStore::new()));
        let err = store.update("missing", InspectionPatch::default()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
