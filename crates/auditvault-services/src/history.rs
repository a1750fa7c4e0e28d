//! Upload history kept in the local store under `fileUploadHistory`.

use std::sync::Arc;

use auditvault_core::constants::UPLOAD_HISTORY_KEY;
use auditvault_core::models::{FileHistory, HistoryStatus};
use auditvault_core::AppError;
use chrono::Utc;

use crate::storage::{KeyValueStore, KeyValueStoreExt};
use crate::workflow::SubmissionRecord;

pub struct UploadHistory {
    store: Arc<dyn KeyValueStore>,
}

impl UploadHistory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored entries, oldest first. A corrupted entry is removed and reads as empty.
    pub fn entries(&self) -> Result<Vec<FileHistory>, AppError> {
        match self.store.get_json::<Vec<FileHistory>>(UPLOAD_HISTORY_KEY) {
            Ok(entries) => Ok(entries.unwrap_or_default()),
            Err(e) => {
                tracing::error!(error = %e, "Error parsing upload history, clearing it");
                self.store.remove(UPLOAD_HISTORY_KEY)?;
                Ok(Vec::new())
            }
        }
    }

    pub fn append(&self, entry: FileHistory) -> Result<(), AppError> {
        let mut entries = self.entries()?;
        entries.push(entry);
        self.store.set_json(UPLOAD_HISTORY_KEY, &entries)
    }

    /// Record a completed submission as a signed entry.
    pub fn record_submission(&self, record: &SubmissionRecord) -> Result<FileHistory, AppError> {
        let now = Utc::now();
        let entry = FileHistory {
            id: now.timestamp_millis().to_string(),
            ipfs_cid: record.content.ipfs_cid.clone(),
            document_name: record.file_name.clone(),
            status: HistoryStatus::Signed,
            timestamp: now,
            data: Some(record.payload.clone()),
        };
        self.append(entry.clone())?;
        Ok(entry)
    }
}
