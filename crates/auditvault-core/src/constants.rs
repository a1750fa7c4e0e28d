//! Storage keys and fixed external locations.

/// Local storage key holding the persisted auth session.
pub const AUTH_STORAGE_KEY: &str = "auth-storage";

/// Local storage key holding the upload history array.
pub const UPLOAD_HISTORY_KEY: &str = "fileUploadHistory";

/// Local storage key holding inspection records shown on the dashboards.
pub const INSPECTIONS_KEY: &str = "inspectionRecords";

/// Session storage key holding the cached signed payload.
pub const SIGNED_PAYLOAD_KEY: &str = "signPayloadResponse";

/// Where users are sent when no account provider is installed.
pub const WALLET_INSTALL_URL: &str = "https://metamask.io/download.html";

/// Block explorer used for transaction verification links.
pub const EXPLORER_TX_URL: &str = "https://mumbai.polygonscan.com/tx";

/// EIP-1193 error code returned when the user rejects a request.
pub const USER_REJECTED_CODE: i64 = 4001;

pub fn verification_link(tx_hash: &str) -> String {
    format!("{}/{}", EXPLORER_TX_URL, tx_hash)
}
