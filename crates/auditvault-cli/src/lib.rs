pub mod provider;

use auditvault_core::{AppError, ErrorMetadata, LogLevel};

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Log an error at its own level and turn it into the message shown to the user.
pub fn user_error(err: AppError) -> anyhow::Error {
    match err.log_level() {
        LogLevel::Error => tracing::error!(code = err.error_code(), "{}", err.detailed_message()),
        LogLevel::Warn => tracing::warn!(code = err.error_code(), "{}", err.detailed_message()),
        LogLevel::Debug => tracing::debug!(code = err.error_code(), "{}", err),
    }
    match err.suggested_action() {
        Some(action) => anyhow::anyhow!("{} ({})", err.client_message(), action),
        None => anyhow::anyhow!("{}", err.client_message()),
    }
}


/// Initialize tracing for the CLI.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
