//! Configuration module
//!
//! Client-side configuration: where the analysis and ledger services live,
//! where local/session state is kept, and a few UI timings.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const ANALYSIS_URL: &str = "http://127.0.0.1:8000";
const LEDGER_URL: &str = "http://127.0.0.1:8001";
const STATE_DIR: &str = ".auditvault";
const ACTIVITY_LIMIT: u32 = 50;
const NOTIFICATION_TTL_SECS: u64 = 5;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub analysis_url: String,
    pub ledger_url: String,
    pub api_key: Option<String>,
    pub state_dir: PathBuf,
    /// No timeout when unset; requests wait for the network stack.
    pub http_timeout_secs: Option<u64>,
    pub activity_limit: u32,
    pub notification_ttl_secs: u64,
    pub environment: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            analysis_url: ANALYSIS_URL.to_string(),
            ledger_url: LEDGER_URL.to_string(),
            api_key: None,
            state_dir: PathBuf::from(STATE_DIR),
            http_timeout_secs: None,
            activity_limit: ACTIVITY_LIMIT,
            notification_ttl_secs: NOTIFICATION_TTL_SECS,
            environment: "development".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let analysis_url = env::var("AUDITVAULT_ANALYSIS_URL")
            .unwrap_or_else(|_| ANALYSIS_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let ledger_url = env::var("AUDITVAULT_LEDGER_URL")
            .unwrap_or_else(|_| LEDGER_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let api_key = env::var("AUDITVAULT_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let state_dir = env::var("AUDITVAULT_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(STATE_DIR));

        let http_timeout_secs = env_number("AUDITVAULT_HTTP_TIMEOUT_SECS")?;
        let activity_limit = env_number("AUDITVAULT_ACTIVITY_LIMIT")?.unwrap_or(ACTIVITY_LIMIT);
        let notification_ttl_secs =
            env_number("AUDITVAULT_NOTIFICATION_TTL_SECS")?.unwrap_or(NOTIFICATION_TTL_SECS);

        let environment = env::var("AUDITVAULT_ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let config = Self {
            analysis_url,
            ledger_url,
            api_key,
            state_dir,
            http_timeout_secs,
            activity_limit,
            notification_ttl_secs,
            environment,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        for (name, url) in [
            ("AUDITVAULT_ANALYSIS_URL", &self.analysis_url),
            ("AUDITVAULT_LEDGER_URL", &self.ledger_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow::anyhow!(
                    "{} must start with http:// or https:// (got '{}')",
                    name,
                    url
                ));
            }
        }

        if self.activity_limit == 0 {
            return Err(anyhow::anyhow!(
                "AUDITVAULT_ACTIVITY_LIMIT must be greater than 0"
            ));
        }

        if self.notification_ttl_secs == 0 {
            return Err(anyhow::anyhow!(
                "AUDITVAULT_NOTIFICATION_TTL_SECS must be greater than 0"
            ));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }

    pub fn local_store_path(&self) -> PathBuf {
        self.state_dir.join("local.json")
    }

    pub fn session_store_path(&self) -> PathBuf {
        self.state_dir.join("session.json")
    }
}

/// Numeric variable, `None` when unset. A value that does not parse is an error.
fn env_number<T>(name: &str) -> Result<Option<T>, anyhow::Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => parse_number(name, &value).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_number<T>(name: &str, value: &str) -> Result<T, anyhow::Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("{} must be a number (got '{}'): {}", name, value, e))
}
