//! AuditVault Core Library
//!
//! This crate provides core domain models, error types, configuration, and the
//! gateway traits that describe the external analysis and ledger services.
//! It is shared across all AuditVault components.

pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod models;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{ApiError, AppError, ErrorMetadata, LogLevel};
pub use gateway::{AnalysisGateway, ApprovalLedger, LedgerGateway};
