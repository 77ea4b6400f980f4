//! Client configuration.

use std::time::Duration;

/// Environment variable holding the project URL.
pub const PROJECT_URL_ENV: &str = "MEMOBASE_PROJECT_URL";
/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "MEMOBASE_API_KEY";
/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "MEMOBASE_TIMEOUT_SECS";

/// Project URL used when none is configured.
pub const DEFAULT_PROJECT_URL: &str = "http://localhost:8019";
/// API prefix appended to the project URL.
pub const DEFAULT_API_VERSION: &str = "api/v1";

/// Configuration for connecting to a Memobase project.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Project URL (e.g. `http://localhost:8019`).
    pub project_url: String,
    /// Bearer credential. Falls back to `MEMOBASE_API_KEY` when unset.
    pub api_key: Option<String>,
    /// API prefix, `api/v1` by default.
    pub api_version: Option<String>,
    /// Request timeout.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a new configuration with defaults.
    pub fn new(project_url: impl Into<String>) -> Self {
        Self {
            project_url: project_url.into(),
            api_key: None,
            api_version: None,
            timeout: None,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads:
    /// - `MEMOBASE_PROJECT_URL` (defaults to `http://localhost:8019`)
    /// - `MEMOBASE_API_KEY` (optional)
    /// - `MEMOBASE_TIMEOUT_SECS` (optional, default 60)
    pub fn from_env() -> Self {
        let project_url =
            std::env::var(PROJECT_URL_ENV).unwrap_or_else(|_| DEFAULT_PROJECT_URL.to_string());
        let api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        let timeout = std::env::var(TIMEOUT_ENV)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);

        Self {
            project_url,
            api_key,
            api_version: None,
            timeout,
        }
    }

    /// Override the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the API prefix.
    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Override the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Pick the credential: an explicit, non-empty key wins over the
/// environment-sourced one.
pub(crate) fn resolve_api_key(explicit: Option<String>, from_env: Option<String>) -> Option<String> {
    explicit
        .filter(|k| !k.trim().is_empty())
        .or_else(|| from_env.filter(|k| !k.trim().is_empty()))
}
