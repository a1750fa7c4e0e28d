use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Role selected at login; decides which dashboard and records a user sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Inspector,
    Manager,
    Auditor,
    Regulator,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [
        UserRole::Inspector,
        UserRole::Manager,
        UserRole::Auditor,
        UserRole::Regulator,
    ];
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UserRole::Inspector => write!(f, "inspector"),
            UserRole::Manager => write!(f, "manager"),
            UserRole::Auditor => write!(f, "auditor"),
            UserRole::Regulator => write!(f, "regulator"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inspector" => Ok(UserRole::Inspector),
            "manager" => Ok(UserRole::Manager),
            "auditor" => Ok(UserRole::Auditor),
            "regulator" => Ok(UserRole::Regulator),
            _ => Err(anyhow::anyhow!("Invalid role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub wallet_address: String,
    pub role: UserRole,
    pub name: String,
    pub organization: String,
}
