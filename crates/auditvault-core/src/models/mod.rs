//! Data models for the application
//!
//! This module contains all data structures used throughout the application,
//! organized by domain. Wire types use the snake_case field names of the
//! analysis and ledger services.

mod activity;
mod analysis;
mod file;
mod history;
mod inspection;
mod ledger;
mod user;

// Re-export all models for convenient imports
pub use activity::*;
pub use analysis::*;
pub use file::*;
pub use history::*;
pub use inspection::*;
pub use ledger::*;
pub use user::*;
