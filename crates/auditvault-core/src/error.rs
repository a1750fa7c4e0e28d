//! Error types module
//!
//! Two layers of errors are used throughout AuditVault:
//!
//! - [`ApiError`] describes what went wrong on the wire when talking to the
//!   analysis or ledger services (request never arrived, non-2xx response,
//!   malformed body).
//! - [`AppError`] is the domain-level error surfaced to users. External call
//!   failures are wrapped in the variant naming the operation that failed so
//!   that a user-facing message can be produced per operation.
//!
//! No error is fatal: every variant is reported inline and control returns to
//! an interactive state.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like rejected service calls
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the user.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "SIGNING_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether the operation can be retried by the user
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// User-facing message
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Transport-level failure of a call to an external service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The request never reached the server (DNS, connect, reset, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("Service returned status {status}: {body}")]
    Service {
        status: u16,
        /// `detail` field of the JSON error body, if any
        detail: Option<String>,
        body: String,
    },

    /// The response body could not be decoded.
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Server-supplied detail message, if the service provided one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Service { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Analysis service error")]
    Analysis(#[source] ApiError),

    #[error("Upload error")]
    Upload(#[source] ApiError),

    #[error("Signing error")]
    Signing(#[source] ApiError),

    #[error("Submission error")]
    Submission(#[source] ApiError),

    #[error("Certificate error")]
    Certificate(#[source] ApiError),

    #[error("Activity error")]
    Activity(#[source] ApiError),

    #[error("Approval error")]
    Approval(#[source] ApiError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cancelled: {0}")]
    UserCancelled(String),

    #[error("Action '{action}' is not allowed in state {from}")]
    InvalidTransition { from: String, action: &'static str },

    #[error("Another external call is already in flight")]
    CallInFlight,

    #[error("Missing prerequisite: {0}")]
    MissingPrerequisite(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No account provider installed")]
    WalletNotInstalled,

    #[error("Connection rejected by user")]
    WalletRejected,

    #[error("Wallet provider error: {0}")]
    WalletProvider(String),
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Storage(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(format!("JSON error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        AppError::Analysis(_) => (
            "ANALYSIS_SERVICE_ERROR",
            true,
            Some("Check the file and run the analysis again"),
            LogLevel::Warn,
        ),
        AppError::Upload(_) => (
            "UPLOAD_ERROR",
            true,
            Some("Retry the upload"),
            LogLevel::Warn,
        ),
        AppError::Signing(_) => (
            "SIGNING_ERROR",
            true,
            Some("Retry signing or abandon the submission"),
            LogLevel::Warn,
        ),
        AppError::Submission(_) => (
            "SUBMISSION_ERROR",
            true,
            Some("Retry the submission or abandon it"),
            LogLevel::Warn,
        ),
        AppError::Certificate(_) => (
            "CERTIFICATE_ERROR",
            true,
            Some("Check the certificate and try again"),
            LogLevel::Warn,
        ),
        AppError::Activity(_) => (
            "ACTIVITY_ERROR",
            true,
            Some("Refresh to try again"),
            LogLevel::Warn,
        ),
        AppError::Approval(_) => (
            "APPROVAL_ERROR",
            true,
            Some("Retry the approval"),
            LogLevel::Warn,
        ),
        AppError::Validation(_) => (
            "VALIDATION_ERROR",
            false,
            Some("Fill in the missing field and try again"),
            LogLevel::Debug,
        ),
        AppError::UserCancelled(_) => ("USER_CANCELLED", true, None, LogLevel::Debug),
        AppError::InvalidTransition { .. } => (
            "INVALID_TRANSITION",
            false,
            Some("Complete the current step first"),
            LogLevel::Debug,
        ),
        AppError::CallInFlight => (
            "CALL_IN_FLIGHT",
            true,
            Some("Wait for the current operation to finish"),
            LogLevel::Debug,
        ),
        AppError::MissingPrerequisite(_) => (
            "MISSING_PREREQUISITE",
            false,
            Some("Complete the earlier steps first"),
            LogLevel::Debug,
        ),
        AppError::Storage(_) => (
            "STORAGE_ERROR",
            true,
            Some("Check the state directory is writable"),
            LogLevel::Error,
        ),
        AppError::InvalidCredentials => (
            "INVALID_CREDENTIALS",
            false,
            Some("Check e-mail and password"),
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            "NOT_FOUND",
            false,
            Some("Verify the record ID exists"),
            LogLevel::Debug,
        ),
        AppError::WalletNotInstalled => (
            "WALLET_NOT_INSTALLED",
            false,
            Some("Install MetaMask from https://metamask.io/download.html"),
            LogLevel::Debug,
        ),
        AppError::WalletRejected => (
            "WALLET_REJECTED",
            true,
            Some("Try again and approve the connection"),
            LogLevel::Debug,
        ),
        AppError::WalletProvider(_) => (
            "WALLET_PROVIDER_ERROR",
            true,
            Some("Please try again"),
            LogLevel::Warn,
        ),
    }
}

/// Detail message if the service sent one, otherwise the generic fallback.
fn service_message(err: &ApiError, fallback: &str) -> String {
    err.detail()
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

impl AppError {
    /// Get the error type name for detailed error output
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Analysis(_) => "AnalysisServiceError",
            AppError::Upload(_) => "UploadError",
            AppError::Signing(_) => "SigningError",
            AppError::Submission(_) => "SubmissionError",
            AppError::Certificate(_) => "CertificateError",
            AppError::Activity(_) => "ActivityError",
            AppError::Approval(_) => "ApprovalError",
            AppError::Validation(_) => "ValidationError",
            AppError::UserCancelled(_) => "UserCancellation",
            AppError::InvalidTransition { .. } => "InvalidTransition",
            AppError::CallInFlight => "CallInFlight",
            AppError::MissingPrerequisite(_) => "MissingPrerequisite",
            AppError::Storage(_) => "Storage",
            AppError::InvalidCredentials => "InvalidCredentials",
            AppError::NotFound(_) => "NotFound",
            AppError::WalletNotInstalled => "WalletNotInstalled",
            AppError::WalletRejected => "UserRejected",
            AppError::WalletProvider(_) => "ProviderError",
        }
    }

    /// The underlying transport failure, for errors caused by an external call.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            AppError::Analysis(e)
            | AppError::Upload(e)
            | AppError::Signing(e)
            | AppError::Submission(e)
            | AppError::Certificate(e)
            | AppError::Activity(e)
            | AppError::Approval(e) => Some(e),
            _ => None,
        }
    }

    /// Whether the request never reached the server.
    pub fn is_network(&self) -> bool {
        matches!(self.api_error(), Some(ApiError::Network(_)))
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Analysis(e) => service_message(e, "Failed to analyze file"),
            AppError::Upload(e) => service_message(e, "Failed to upload file"),
            AppError::Signing(e) => service_message(e, "Failed to sign payload"),
            AppError::Submission(e) => service_message(e, "Failed to submit inspection"),
            AppError::Certificate(e) => {
                service_message(e, "Certificate operation failed. Please try again.")
            }
            AppError::Activity(e) => match e {
                ApiError::Service { status, body, .. } => format!("HTTP {}: {}", status, body),
                other => other.to_string(),
            },
            AppError::Approval(e) => service_message(e, "Failed to record approval"),
            AppError::Validation(ref msg) => msg.clone(),
            AppError::UserCancelled(ref msg) => msg.clone(),
            AppError::InvalidTransition { from, action } => {
                format!("Cannot {} while {}", action, from)
            }
            AppError::CallInFlight => "Please wait for the current operation".to_string(),
            AppError::MissingPrerequisite(ref msg) => msg.clone(),
            AppError::Storage(_) => "Failed to access local storage".to_string(),
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::WalletNotInstalled => "MetaMask is not detected".to_string(),
            AppError::WalletRejected => {
                "Connection rejected by user. Please try again and approve the connection."
                    .to_string()
            }
            AppError::WalletProvider(ref msg) => format!("Error connecting wallet: {}", msg),
        }
    }
}
