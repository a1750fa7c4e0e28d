//! Terminal account provider
//!
//! Stands in for a browser-injected wallet: the account comes from
//! `AUDITVAULT_WALLET_ADDRESS` and `eth_requestAccounts` asks for approval on
//! the terminal. With no address configured there is no provider at all.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use auditvault_core::constants::USER_REJECTED_CODE;
use auditvault_services::{AccountProvider, ProviderError, ProviderEvent};
use serde_json::{json, Value as JsonValue};
use tokio::sync::broadcast;

pub const WALLET_ADDRESS_ENV: &str = "AUDITVAULT_WALLET_ADDRESS";

type Approver = Box<dyn Fn(&str) -> bool + Send + Sync>;

pub struct TerminalProvider {
    address: String,
    authorized: AtomicBool,
    approve: Approver,
    events: broadcast::Sender<ProviderEvent>,
}

impl TerminalProvider {
    pub fn new(address: impl Into<String>, approve: Approver) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            address: address.into(),
            authorized: AtomicBool::new(false),
            approve,
            events,
        }
    }

    /// Provider for the configured address, confirming on stdin.
    pub fn from_env() -> Option<Self> {
        let address = std::env::var(WALLET_ADDRESS_ENV)
            .ok()
            .filter(|a| !a.trim().is_empty())?;
        Some(Self::new(
            address,
            Box::new(|address| {
                dialoguer::Confirm::new()
                    .with_prompt(format!("Connect account {} to AuditVault?", address))
                    .default(true)
                    .interact()
                    .unwrap_or(false)
            }),
        ))
    }

    fn accounts(&self) -> JsonValue {
        if self.authorized.load(Ordering::SeqCst) {
            json!([self.address])
        } else {
            json!([])
        }
    }
}

#[async_trait]
impl AccountProvider for TerminalProvider {
    async fn request(
        &self,
        method: &str,
        _params: Vec<JsonValue>,
    ) -> Result<JsonValue, ProviderError> {
        match method {
            "eth_accounts" => Ok(self.accounts()),
            "eth_requestAccounts" => {
                if !(self.approve)(&self.address) {
                    return Err(ProviderError {
                        code: USER_REJECTED_CODE,
                        message: "User rejected the request.".to_string(),
                    });
                }
                self.authorized.store(true, Ordering::SeqCst);
                let _ = self
                    .events
                    .send(ProviderEvent::AccountsChanged(vec![self.address.clone()]));
                Ok(self.accounts())
            }
            other => Err(ProviderError {
                code: -32601,
                message: format!("Method {} is not supported", other),
            }),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}
