//! AuditVault services
//!
//! Client-side application logic on top of `auditvault-core`: the inspection
//! submission workflow, persisted auth and history stores, role dashboards,
//! export, activity grouping, the wallet connector and the notification and
//! loading stores.

pub mod activity;
pub mod auth;
pub mod context;
pub mod dashboards;
pub mod export;
pub mod history;
pub mod inspections;
pub mod loading;
pub mod notifications;
pub mod storage;
pub mod wallet;
pub mod workflow;

pub use auth::{AuthSession, AuthStore};
pub use context::AppContext;
pub use dashboards::{
    AuditorDashboard, HashingApprovalLedger, ManagerDashboard, RegulatorDashboard,
};
pub use export::{ExportFormat, ExportSummary};
pub use history::UploadHistory;
pub use inspections::InspectionStore;
pub use loading::{LoadingGuard, LoadingTracker};
pub use notifications::{Notification, NotificationCenter, NotificationKind};
pub use storage::{JsonFileStore, KeyValueStore, KeyValueStoreExt, MemoryStore};
pub use wallet::{AccountProvider, ProviderError, ProviderEvent, WalletConnector, WalletState};
pub use workflow::{
    ConfirmPrompt, ForgeryWarning, SubmissionRecord, SubmissionWorkflow, WorkflowState,
};
