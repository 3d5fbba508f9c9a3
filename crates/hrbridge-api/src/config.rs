//! Process configuration, read once at startup and injected into the
//! components that need it. No process-wide singletons.

use std::time::Duration;

use hrbridge_pega::{PegaConfig, PegaCredentials};
use hrbridge_processor::ProcessorConfig;

use crate::error::AppError;

/// Runtime configuration for the bridge.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Path of the SQLite database file.
    pub database_path: String,
    /// Pega connection settings.
    pub pega: PegaConfig,
    /// Processor tuning (timeouts, callback-failure policy).
    pub processor: ProcessorConfig,
}

impl Config {
    /// Reads the configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a required variable is missing,
    /// a value does not parse, or both credential modes are set.
    pub fn from_env() -> Result<Self, AppError> {
        let host = env_or("HRBRIDGE_HOST", "0.0.0.0");
        let port: u16 = env_or("HRBRIDGE_PORT", "8080")
            .parse()
            .map_err(|err| AppError::Config(format!("HRBRIDGE_PORT must be a valid u16: {err}")))?;
        let database_path = env_or("HRBRIDGE_DATABASE_PATH", "events.db");

        let base_url = std::env::var("PEGA_BASE_URL")
            .map_err(|_| AppError::Config("PEGA_BASE_URL must be set".into()))?;
        let credentials = credentials_from(
            std::env::var("PEGA_API_KEY").ok(),
            std::env::var("PEGA_USERNAME").ok(),
            std::env::var("PEGA_PASSWORD").ok(),
        )?;

        let adapter_timeout = secs_or("HRBRIDGE_ADAPTER_TIMEOUT_SECS", 10)?;
        let callback_timeout = secs_or("HRBRIDGE_CALLBACK_TIMEOUT_SECS", 10)?;
        let fail_event_on_callback_error = env_or("HRBRIDGE_FAIL_ON_CALLBACK_ERROR", "false")
            .parse()
            .map_err(|err| {
                AppError::Config(format!(
                    "HRBRIDGE_FAIL_ON_CALLBACK_ERROR must be true or false: {err}"
                ))
            })?;

        Ok(Self {
            host,
            port,
            database_path,
            pega: PegaConfig::new(base_url)
                .with_credentials(credentials)
                .with_timeout(callback_timeout),
            processor: ProcessorConfig {
                adapter_timeout,
                callback_timeout,
                fail_event_on_callback_error,
            },
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

fn secs_or(name: &str, default: u64) -> Result<Duration, AppError> {
    let value: u64 = env_or(name, &default.to_string())
        .parse()
        .map_err(|err| AppError::Config(format!("{name} must be a number of seconds: {err}")))?;
    Ok(Duration::from_secs(value))
}

/// Resolves the credential mode. Basic auth and API key are mutually
/// exclusive; a username without a password (or vice versa) is a
/// configuration error.
fn credentials_from(
    api_key: Option<String>,
    username: Option<String>,
    password: Option<String>,
) -> Result<PegaCredentials, AppError> {
    match (api_key, username, password) {
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(AppError::Config(
            "PEGA_API_KEY and PEGA_USERNAME/PEGA_PASSWORD are mutually exclusive".into(),
        )),
        (Some(key), None, None) => Ok(PegaCredentials::ApiKey(key)),
        (None, Some(username), Some(password)) => {
            Ok(PegaCredentials::Basic { username, password })
        }
        (None, Some(_), None) | (None, None, Some(_)) => Err(AppError::Config(
            "PEGA_USERNAME and PEGA_PASSWORD must be set together".into(),
        )),
        (None, None, None) => Ok(PegaCredentials::Anonymous),
    }
}
