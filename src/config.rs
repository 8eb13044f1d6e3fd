//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::auth::api::DEFAULT_API_URL;

/// Timeout for ordinary API requests.
/// 30s allows for slow responses while failing fast enough for good UX.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Timeout for refresh exchanges. Shorter than the request timeout because
/// every caller waiting on an in-flight refresh waits at most this long.
const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 10;

/// Configuration for the client core.
///
/// Use the builder methods to customize; [`PlatformConfig::from_env`] picks
/// up overrides from the environment.
///
/// # Example
///
/// ```ignore
/// use satchel::PlatformConfig;
///
/// let config = PlatformConfig::default()
///     .with_api_base_url("http://localhost:8000")
///     .with_request_timeout(std::time::Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Base URL of the Satchel API.
    pub api_base_url: String,
    /// Timeout applied to ordinary API requests.
    pub request_timeout: Duration,
    /// Timeout applied to refresh exchanges.
    pub refresh_timeout: Duration,
    /// Override for the credentials file location. `None` uses
    /// `~/.satchel/.credentials.json`.
    pub credentials_path: Option<PathBuf>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            refresh_timeout: Duration::from_secs(DEFAULT_REFRESH_TIMEOUT_SECS),
            credentials_path: None,
        }
    }
}

impl PlatformConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the refresh timeout.
    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// Set the credentials file location.
    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    /// Create a config from the environment.
    /// `SATCHEL_API_URL` overrides the API base URL.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("SATCHEL_API_URL") {
            if !url.is_empty() {
                config.api_base_url = url;
            }
        }
        config
    }
}
