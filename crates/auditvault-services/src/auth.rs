//! Auth session store
//!
//! Credentials are checked against a built-in demo directory; the resulting
//! session is persisted in the local store under `auth-storage`.

use std::sync::{Arc, RwLock};

use auditvault_core::constants::AUTH_STORAGE_KEY;
use auditvault_core::models::{User, UserRole};
use auditvault_core::AppError;
use serde::{Deserialize, Serialize};

use crate::storage::{KeyValueStore, KeyValueStoreExt};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: Option<User>,
    pub is_logged_in: bool,
}

struct DirectoryEntry {
    password: &'static str,
    user: User,
}

fn demo_directory() -> Vec<DirectoryEntry> {
    let entry = |id: &str,
                 role: UserRole,
                 wallet: &str,
                 name: &str,
                 organization: &str,
                 password: &'static str| DirectoryEntry {
        password,
        user: User {
            id: id.to_string(),
            email: format!("{}@complichain.com", role),
            wallet_address: wallet.to_string(),
            role,
            name: name.to_string(),
            organization: organization.to_string(),
        },
    };

    vec![
        entry(
            "1",
            UserRole::Inspector,
            "0x1234...5678",
            "John Inspector",
            "SafeCheck Inc",
            "inspector123",
        ),
        entry(
            "2",
            UserRole::Manager,
            "0x9876...5432",
            "Sarah Manager",
            "SafeCheck Inc",
            "manager123",
        ),
        entry(
            "3",
            UserRole::Auditor,
            "0xabcd...ef01",
            "Mike Auditor",
            "Compliance Audits Ltd",
            "auditor123",
        ),
        entry(
            "4",
            UserRole::Regulator,
            "0xfedc...ba98",
            "Alice Regulator",
            "Safety Authority",
            "regulator123",
        ),
    ]
}

pub struct AuthStore {
    store: Arc<dyn KeyValueStore>,
    session: RwLock<AuthSession>,
}

impl AuthStore {
    /// Load the persisted session, starting logged out if there is none.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, AppError> {
        let session = store
            .get_json::<AuthSession>(AUTH_STORAGE_KEY)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring unreadable auth session");
                None
            })
            .unwrap_or_default();

        Ok(Self {
            store,
            session: RwLock::new(session),
        })
    }

    fn replace(&self, session: AuthSession) -> Result<(), AppError> {
        self.store.set_json(AUTH_STORAGE_KEY, &session)?;
        let mut guard = self
            .session
            .write()
            .map_err(|_| AppError::Storage("auth lock poisoned".to_string()))?;
        *guard = session;
        Ok(())
    }

    pub fn current(&self) -> AuthSession {
        self.session
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn user(&self) -> Option<User> {
        self.current().user
    }

    /// Role selection at login is recorded in the log only; the account's own
    /// role decides what the user sees.
    pub fn login(&self, email: &str, password: &str, role: UserRole) -> Result<User, AppError> {
        let entry = demo_directory()
            .into_iter()
            .find(|e| e.user.email.eq_ignore_ascii_case(email.trim()))
            .filter(|e| e.password == password)
            .ok_or(AppError::InvalidCredentials)?;

        tracing::info!(email = %entry.user.email, selected_role = %role, "User logged in");
        self.replace(AuthSession {
            user: Some(entry.user.clone()),
            is_logged_in: true,
        })?;
        Ok(entry.user)
    }

    /// Attach a wallet address to the logged-in user; no-op when logged out.
    pub fn connect_wallet(&self, address: &str) -> Result<(), AppError> {
        let mut session = self.current();
        let Some(user) = session.user.as_mut() else {
            return Ok(());
        };
        user.wallet_address = address.to_string();
        session.is_logged_in = true;
        tracing::info!(address = %address, "Wallet attached to session");
        self.replace(session)
    }

    pub fn set_user(&self, user: User) -> Result<(), AppError> {
        self.replace(AuthSession {
            user: Some(user),
            is_logged_in: true,
        })
    }

    pub fn logout(&self) -> Result<(), AppError> {
        tracing::info!("User logged out");
        self.replace(AuthSession::default())
    }
}
