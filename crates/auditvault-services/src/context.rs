//! Long-lived services shared by every command, built once at startup.

use std::sync::Arc;

use auditvault_core::{AnalysisGateway, AppError, ApprovalLedger, ClientConfig, LedgerGateway};

use crate::auth::AuthStore;
use crate::dashboards::{
    AuditorDashboard, HashingApprovalLedger, ManagerDashboard, RegulatorDashboard,
};
use crate::history::UploadHistory;
use crate::inspections::InspectionStore;
use crate::loading::LoadingTracker;
use crate::notifications::NotificationCenter;
use crate::storage::{JsonFileStore, KeyValueStore};
use crate::wallet::{AccountProvider, WalletConnector};
use crate::workflow::SubmissionWorkflow;

#[derive(Clone)]
pub struct AppContext {
    pub config: ClientConfig,
    pub analysis: Arc<dyn AnalysisGateway>,
    pub ledger: Arc<dyn LedgerGateway>,
    pub approvals: Arc<dyn ApprovalLedger>,
    pub local: Arc<dyn KeyValueStore>,
    pub session: Arc<dyn KeyValueStore>,
    pub auth: Arc<AuthStore>,
    pub history: Arc<UploadHistory>,
    pub inspections: Arc<InspectionStore>,
    pub notifications: NotificationCenter,
    pub loading: LoadingTracker,
    pub wallet: WalletConnector,
}

impl AppContext {
    /// Open the file-backed stores under the configured state directory.
    pub fn open(
        config: ClientConfig,
        analysis: Arc<dyn AnalysisGateway>,
        ledger: Arc<dyn LedgerGateway>,
        provider: Option<Arc<dyn AccountProvider>>,
    ) -> Result<Self, AppError> {
        let local: Arc<dyn KeyValueStore> =
            Arc::new(JsonFileStore::open(config.local_store_path())?);
        let session: Arc<dyn KeyValueStore> =
            Arc::new(JsonFileStore::open(config.session_store_path())?);
        Self::with_stores(config, analysis, ledger, provider, local, session)
    }

    pub fn with_stores(
        config: ClientConfig,
        analysis: Arc<dyn AnalysisGateway>,
        ledger: Arc<dyn LedgerGateway>,
        provider: Option<Arc<dyn AccountProvider>>,
        local: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
    ) -> Result<Self, AppError> {
        tracing::debug!(
            state_dir = %config.state_dir.display(),
            environment = %config.environment,
            "Building application context"
        );

        Ok(Self {
            auth: Arc::new(AuthStore::load(local.clone())?),
            history: Arc::new(UploadHistory::new(local.clone())),
            inspections: Arc::new(InspectionStore::load(local.clone())?),
            notifications: NotificationCenter::new(config.notification_ttl()),
            loading: LoadingTracker::new(),
            wallet: WalletConnector::new(provider),
            approvals: Arc::new(HashingApprovalLedger),
            config,
            analysis,
            ledger,
            local,
            session,
        })
    }

    /// Workflow instance resumed from the session cache, if any.
    pub fn workflow(&self) -> Result<SubmissionWorkflow, AppError> {
        SubmissionWorkflow::restore(
            self.analysis.clone(),
            self.ledger.clone(),
            self.session.clone(),
        )
    }

    fn actor_address(&self) -> String {
        self.wallet
            .account()
            .or_else(|| self.auth.user().map(|u| u.wallet_address))
            .unwrap_or_default()
    }

    pub fn manager_dashboard(&self) -> ManagerDashboard {
        ManagerDashboard::new(
            self.inspections.clone(),
            self.approvals.clone(),
            self.notifications.clone(),
            self.actor_address(),
        )
    }

    pub fn auditor_dashboard(&self) -> AuditorDashboard {
        AuditorDashboard::new(
            self.inspections.clone(),
            self.approvals.clone(),
            self.notifications.clone(),
            self.actor_address(),
        )
    }

    pub fn regulator_dashboard(&self) -> RegulatorDashboard {
        RegulatorDashboard::new(self.inspections.clone())
    }
}
