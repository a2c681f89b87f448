//! Civitai API client configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the Civitai metadata client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CivitaiConfig {
    /// REST API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Optional API key, sent as a bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://civitai.com/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for CivitaiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CivitaiConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `CIVITAI_BASE_URL`: API base URL
    /// - `CIVITAI_API_KEY`: API key
    /// - `CIVITAI_TIMEOUT_SECS`: request timeout
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("CIVITAI_BASE_URL") {
            self.base_url = val;
        }
        if let Ok(val) = std::env::var("CIVITAI_API_KEY") {
            if !val.trim().is_empty() {
                self.api_key = Some(val);
            }
        }
        if let Ok(val) = std::env::var("CIVITAI_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                self.timeout_secs = n;
            }
        }
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Base URL without a trailing slash.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
