//! Client configuration.
//!
//! The base URL is injected here instead of living in a process-wide
//! constant. Values can come from code, from a deserialized document, or from
//! the environment.

use serde::{Deserialize, Serialize};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prefix for relative request urls. Empty by default.
    pub base_url: String,
    /// Timeout applied when a call does not specify one. `0` disables it.
    pub timeout_secs: u64,
    /// Cookie sent with requests whose credentials mode allows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cookie: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Read `FETCH_BASE_URL`, `FETCH_TIMEOUT_SECS` and `FETCH_COOKIE`.
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = std::env::var("FETCH_BASE_URL") {
            config = config.with_base_url(&base_url);
        }
        match std::env::var("FETCH_TIMEOUT_SECS").map(|v| v.parse::<u64>()) {
            Ok(Ok(secs)) => config.timeout_secs = secs,
            Ok(Err(e)) => tracing::warn!(error = %e, "ignoring invalid FETCH_TIMEOUT_SECS"),
            Err(_) => {}
        }
        if let Ok(cookie) = std::env::var("FETCH_COOKIE") {
            config.cookie = Some(cookie);
        }
        config
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }
}
