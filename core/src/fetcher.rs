//! The three public operations: JSON request, form upload, file download.
//!
//! Each one builds a request with `FetchClient`, runs it through a
//! `Transport`, and parses the response. Failures are logged where they are
//! observed and then returned to the caller.

use std::path::PathBuf;

use serde::de::DeserializeOwned;

use crate::client::FetchClient;
use crate::download::SaveTarget;
use crate::error::FetchError;
use crate::form::FormData;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{DownloadParams, RequestParams, UploadParams};

#[derive(Debug, Clone)]
pub struct Fetcher<T> {
    client: FetchClient,
    transport: T,
}

#[cfg(feature = "ureq")]
impl Fetcher<crate::transport::UreqTransport> {
    /// Client configured from the environment over the default transport.
    pub fn from_env() -> Self {
        Self::new(
            FetchClient::new(crate::config::ClientConfig::from_env()),
            crate::transport::UreqTransport::new(),
        )
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn new(client: FetchClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &FetchClient {
        &self.client
    }

    /// Send a JSON request and parse the JSON response.
    pub fn fetch_request<R: DeserializeOwned>(
        &self,
        url: &str,
        method: HttpMethod,
        params: &RequestParams,
    ) -> Result<R, FetchError> {
        self.client
            .build_request(url, method, params)
            .and_then(|request| self.send(&request))
            .and_then(|response| self.client.parse_json(&response))
            .inspect_err(|e| report(url, e))
    }

    /// Upload `form` as `multipart/form-data` and parse the JSON response.
    pub fn fetch_form_data<R: DeserializeOwned>(
        &self,
        url: &str,
        form: &FormData,
        params: &UploadParams,
    ) -> Result<R, FetchError> {
        let request = self.client.build_form_data(url, form, params);
        self.send(&request)
            .and_then(|response| self.client.parse_json(&response))
            .inspect_err(|e| report(url, e))
    }

    /// Download `url` and hand the body to `target`. Returns the saved path.
    ///
    /// The body is buffered in memory before saving, so the transport's body
    /// limit (`UreqTransport::with_body_limit`) bounds the download size.
    pub fn fetch_download_blob(
        &self,
        url: &str,
        params: &DownloadParams,
        file_type: &str,
        target: &dyn SaveTarget,
    ) -> Result<PathBuf, FetchError> {
        let request = self.client.build_download(url, params);
        let response = self.send(&request)?;
        let download = self.client.parse_download(response, file_type)?;
        Ok(target.save(&download)?)
    }

    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        self.transport.execute(request)
    }
}

fn report(url: &str, err: &FetchError) {
    if err.is_timeout() {
        tracing::warn!(url, error = %err, "request timed out");
    } else {
        tracing::error!(url, error = %err, "request failed");
    }
}
