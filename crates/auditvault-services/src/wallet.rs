//! Wallet connector
//!
//! Wraps an injected EIP-1193 style account provider. The connector never
//! prompts unless [`WalletConnector::connect`] is called, and it never calls
//! the provider at all when none is installed. Provider events are applied to
//! the local state by a background task started with
//! [`WalletConnector::spawn_event_listener`].

use std::sync::Arc;

use async_trait::async_trait;
use auditvault_core::constants::USER_REJECTED_CODE;
use auditvault_core::AppError;
use serde_json::Value as JsonValue;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Error returned by the provider for a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<String>),
    ChainChanged(String),
    Disconnect(String),
}

#[async_trait]
pub trait AccountProvider: Send + Sync {
    fn is_metamask(&self) -> bool {
        false
    }

    /// Whether the provider exposes a usable `request` method.
    fn supports_requests(&self) -> bool {
        true
    }

    async fn request(&self, method: &str, params: Vec<JsonValue>)
        -> Result<JsonValue, ProviderError>;

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletState {
    pub connected: bool,
    pub account: Option<String>,
    pub is_connecting: bool,
    pub has_provider: bool,
    pub chain_id: Option<String>,
}

#[derive(Clone)]
pub struct WalletConnector {
    provider: Option<Arc<dyn AccountProvider>>,
    state: Arc<watch::Sender<WalletState>>,
}

fn parse_accounts(value: JsonValue) -> Result<Vec<String>, AppError> {
    serde_json::from_value(value)
        .map_err(|e| AppError::WalletProvider(format!("Unexpected accounts response: {}", e)))
}

impl WalletConnector {
    pub fn new(provider: Option<Arc<dyn AccountProvider>>) -> Self {
        let (tx, _rx) = watch::channel(WalletState {
            has_provider: provider.is_some(),
            ..WalletState::default()
        });
        Self {
            provider,
            state: Arc::new(tx),
        }
    }

    pub fn state(&self) -> WalletState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WalletState> {
        self.state.subscribe()
    }

    pub fn account(&self) -> Option<String> {
        self.state.borrow().account.clone()
    }

    fn set_account(&self, account: Option<String>) {
        self.state.send_modify(|s| {
            s.connected = account.is_some();
            s.account = account;
        });
    }

    pub fn check_installed(&self) -> bool {
        let detected = self
            .provider
            .as_ref()
            .map(|p| p.is_metamask() || p.supports_requests())
            .unwrap_or(false);
        self.state.send_modify(|s| s.has_provider = detected);
        detected
    }

    /// Read already-authorized accounts without prompting.
    pub async fn check_connection(&self) -> Option<String> {
        let Some(provider) = self.provider.as_ref() else {
            self.state.send_modify(|s| s.has_provider = false);
            return None;
        };

        match provider.request("eth_accounts", Vec::new()).await {
            Ok(value) => match parse_accounts(value) {
                Ok(accounts) => {
                    let account = accounts.into_iter().next();
                    self.state.send_modify(|s| {
                        s.has_provider = true;
                        s.connected = account.is_some();
                        s.account = account.clone();
                    });
                    account
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Error checking wallet connection");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Error checking wallet connection");
                self.state.send_modify(|s| s.has_provider = true);
                None
            }
        }
    }

    /// Prompt the user to authorize an account.
    pub async fn connect(&self) -> Result<String, AppError> {
        if !self.check_installed() {
            return Err(AppError::WalletNotInstalled);
        }
        let provider = self.provider.as_ref().ok_or(AppError::WalletNotInstalled)?;

        self.state.send_modify(|s| s.is_connecting = true);
        let result = provider.request("eth_requestAccounts", Vec::new()).await;
        self.state.send_modify(|s| s.is_connecting = false);

        let accounts = match result {
            Ok(value) => parse_accounts(value)?,
            Err(e) if e.code == USER_REJECTED_CODE => {
                tracing::info!("Wallet connection rejected by user");
                return Err(AppError::WalletRejected);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Error connecting wallet");
                return Err(AppError::WalletProvider(e.message));
            }
        };

        let account = accounts.into_iter().next().ok_or_else(|| {
            AppError::WalletProvider("Provider returned no accounts".to_string())
        })?;
        tracing::info!(account = %account, "Wallet connected");
        self.set_account(Some(account.clone()));
        Ok(account)
    }

    /// Clears local state only; the provider keeps its authorization.
    pub fn disconnect(&self) {
        self.set_account(None);
        tracing::info!("Wallet disconnected from app (local state cleared)");
    }

    pub async fn apply_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => {
                tracing::debug!(?accounts, "Accounts changed");
                self.set_account(accounts.into_iter().next());
            }
            ProviderEvent::ChainChanged(chain_id) => {
                tracing::info!(chain_id = %chain_id, "Chain changed, re-reading connection");
                self.state.send_modify(|s| {
                    s.chain_id = Some(chain_id);
                    s.connected = false;
                    s.account = None;
                });
                self.check_connection().await;
            }
            ProviderEvent::Disconnect(reason) => {
                tracing::info!(reason = %reason, "Provider disconnected");
                self.state.send_modify(|s| {
                    s.has_provider = false;
                    s.connected = false;
                    s.account = None;
                });
            }
        }
    }

    /// Apply provider events until the provider's channel closes. Returns
    /// `None` when no provider is installed.
    pub fn spawn_event_listener(&self) -> Option<JoinHandle<()>> {
        let mut rx = self.provider.as_ref()?.subscribe();
        let connector = self.clone();
        Some(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => connector.apply_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Wallet event listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct MockProvider {
        accounts: Mutex<Vec<String>>,
        reject_with: Option<ProviderError>,
        calls: Mutex<Vec<String>>,
        events: broadcast::Sender<ProviderEvent>,
    }

    impl MockProvider {
        fn new(accounts: &[&str]) -> Self {
            let (events, _) = broadcast::channel(16);
            Self {
                accounts: Mutex::new(accounts.iter().map(|a| a.to_string()).collect()),
                reject_with: None,
                calls: Mutex::new(Vec::new()),
                events,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AccountProvider for MockProvider {
        fn is_metamask(&self) -> bool {
            true
        }

        async fn request(
            &self,
            method: &str,
            _params: Vec<JsonValue>,
        ) -> Result<JsonValue, ProviderError> {
            self.calls.lock().unwrap().push(method.to_string());
            if method == "eth_requestAccounts" {
                if let Some(err) = &self.reject_with {
                    return Err(err.clone());
                }
            }
            Ok(serde_json::to_value(self.accounts.lock().unwrap().clone()).unwrap())
        }

        fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
            self.events.subscribe()
        }
    }

    #[tokio::test]
    async fn connect_without_provider_never_requests() {
        let wallet = WalletConnector::new(None);
        assert!(!wallet.check_installed());
        let err = wallet.connect().await.unwrap_err();
        assert!(matches!(err, AppError::WalletNotInstalled));
        assert!(wallet.spawn_event_listener().is_none());
    }

    #[tokio::test]
    async fn connect_sets_account() {
        let provider = Arc::new(MockProvider::new(&["0xabc", "0xdef"]));
        let wallet = WalletConnector::new(Some(provider.clone()));

        let account = wallet.connect().await.unwrap();
        assert_eq!(account, "0xabc");
        let state = wallet.state();
        assert!(state.connected);
        assert!(!state.is_connecting);
        assert_eq!(provider.calls(), vec!["eth_requestAccounts".to_string()]);
    }

    #[tokio::test]
    async fn user_rejection_maps_to_rejected() {
        let mut provider = MockProvider::new(&["0xabc"]);
        provider.reject_with = Some(ProviderError {
            code: 4001,
            message: "User rejected the request.".into(),
        });
        let wallet = WalletConnector::new(Some(Arc::new(provider)));

        let err = wallet.connect().await.unwrap_err();
        assert!(matches!(err, AppError::WalletRejected));
        assert!(!wallet.state().connected);
    }

    #[tokio::test]
    async fn other_provider_errors_map_to_provider_error() {
        let mut provider = MockProvider::new(&["0xabc"]);
        provider.reject_with = Some(ProviderError {
            code: -32002,
            message: "Request already pending".into(),
        });
        let wallet = WalletConnector::new(Some(Arc::new(provider)));

        match wallet.connect().await.unwrap_err() {
            AppError::WalletProvider(msg) => assert_eq!(msg, "Request already pending"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn check_connection_does_not_prompt() {
        let provider = Arc::new(MockProvider::new(&["0xabc"]));
        let wallet = WalletConnector::new(Some(provider.clone()));

        assert_eq!(wallet.check_connection().await.as_deref(), Some("0xabc"));
        assert_eq!(provider.calls(), vec!["eth_accounts".to_string()]);
    }

    #[tokio::test]
    async fn disconnect_clears_local_state_only() {
        let provider = Arc::new(MockProvider::new(&["0xabc"]));
        let wallet = WalletConnector::new(Some(provider.clone()));
        wallet.connect().await.unwrap();

        wallet.disconnect();
        assert_eq!(wallet.account(), None);
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn events_update_state() {
        let provider = Arc::new(MockProvider::new(&["0xabc"]));
        let wallet = WalletConnector::new(Some(provider.clone()));
        wallet.connect().await.unwrap();

        wallet
            .apply_event(ProviderEvent::AccountsChanged(vec!["0x999".into()]))
            .await;
        assert_eq!(wallet.account().as_deref(), Some("0x999"));

        wallet.apply_event(ProviderEvent::AccountsChanged(vec![])).await;
        assert!(!wallet.state().connected);

        wallet
            .apply_event(ProviderEvent::ChainChanged("0x89".into()))
            .await;
        let state = wallet.state();
        assert_eq!(state.chain_id.as_deref(), Some("0x89"));
        assert_eq!(state.account.as_deref(), Some("0xabc"));

        wallet
            .apply_event(ProviderEvent::Disconnect("closed".into()))
            .await;
        let state = wallet.state();
        assert!(!state.has_provider);
        assert_eq!(state.account, None);
    }

    #[tokio::test]
    async fn listener_applies_broadcast_events() {
        let provider = Arc::new(MockProvider::new(&["0xabc"]));
        let wallet = WalletConnector::new(Some(provider.clone()));
        let mut rx = wallet.subscribe();
        let handle = wallet.spawn_event_listener().unwrap();

        provider
            .events
            .send(ProviderEvent::AccountsChanged(vec!["0x555".into()]))
            .unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().account.as_deref(), Some("0x555"));

        handle.abort();
    }
}
