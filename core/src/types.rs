//! Per-call parameter objects.
//!
//! Each public operation takes one of these. All fields are optional; the
//! builder methods exist so call sites read like the plain object literals
//! they replace.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameters for `fetch_request`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// Seconds before the request is cancelled. `Some(0)` disables the timer;
    /// `None` uses the client's configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout = Some(secs);
        self
    }
}

/// Parameters for `fetch_form_data`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Map<String, Value>>,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
}

impl UploadParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Parameters for `fetch_download_blob`. Same shape as an upload.
pub type DownloadParams = UploadParams;
