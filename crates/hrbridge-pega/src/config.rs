//! Pega client configuration.

use std::time::Duration;

/// Authentication for the Pega REST API. Basic auth and API key are
/// mutually exclusive; anonymous access is allowed for development setups.
#[derive(Debug, Clone)]
pub enum PegaCredentials {
    /// No authentication.
    Anonymous,
    /// HTTP basic auth.
    Basic {
        /// Pega operator name.
        username: String,
        /// Operator password.
        password: String,
    },
    /// Bearer API key.
    ApiKey(String),
}

/// Connection settings for the Pega REST API, injected at construction
/// time.
#[derive(Debug, Clone)]
pub struct PegaConfig {
    /// Base URL of the API, e.g. `https://pega.example.com/prweb/api/v1`.
    pub base_url: String,
    /// Authentication mode.
    pub credentials: PegaCredentials,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl PegaConfig {
    /// Creates an anonymous configuration with the default timeout.
    /// Trailing slashes on the base URL are stripped.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            base_url,
            credentials: PegaCredentials::Anonymous,
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: PegaCredentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
