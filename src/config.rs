// Client configuration. Everything is decided in code: the CLI takes no
// flags and reads no config file, so the defaults below are what runs.

use std::time::Duration;

/// Public GitHub REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Upper bound on the fork request. Other calls use the transport default.
pub const FORK_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings used to build an [`crate::api::ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub fork_timeout: Duration,
}

impl ClientConfig {
    /// Same defaults, different host. Tests point this at a mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        ClientConfig {
            base_url,
            ..ClientConfig::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            // GitHub refuses requests without a User-Agent.
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            fork_timeout: FORK_TIMEOUT,
        }
    }
}
