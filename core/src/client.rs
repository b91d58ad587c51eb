//! Stateless HTTP request builder and response parser.
//!
//! # Design
//! `FetchClient` holds only its `ClientConfig` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Executing the round-trip in between is left to a
//! `Transport`, keeping this half deterministic and free of I/O.

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ClientConfig;
use crate::download::{filename_from_disposition, timestamp_name, Download};
use crate::error::FetchError;
use crate::form::FormData;
use crate::http::{headers, merge_headers, Credentials, HttpMethod, HttpRequest, HttpResponse};
use crate::intercept::{check_status, intercept};
use crate::query::append_query;
use crate::types::{DownloadParams, RequestParams, UploadParams};

/// Synchronous, stateless client.
#[derive(Debug, Clone, Default)]
pub struct FetchClient {
    config: ClientConfig,
}

impl FetchClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// JSON request. Caller headers are appended after the default
    /// `content-type`; `data` becomes the body only for `POST`/`PUT`/`PATCH`.
    pub fn build_request(
        &self,
        url: &str,
        method: HttpMethod,
        params: &RequestParams,
    ) -> Result<HttpRequest, FetchError> {
        let mut header_list = headers(&[("content-type", "application/json")]);
        merge_headers(&mut header_list, &params.headers);

        let body = match (&params.data, method.carries_body()) {
            (Some(data), true) => Some(
                serde_json::to_vec(data).map_err(|e| FetchError::SerializationError(e.to_string()))?,
            ),
            _ => None,
        };

        let timeout_secs = params.timeout.unwrap_or(self.config.timeout_secs);
        let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        Ok(self.finish(
            method,
            url,
            params.query.as_ref(),
            header_list,
            body,
            timeout,
            Credentials::SameOrigin,
        ))
    }

    /// Multipart upload. Always `POST` with credentials included.
    pub fn build_form_data(&self, url: &str, form: &FormData, params: &UploadParams) -> HttpRequest {
        let (content_type, body) = form.encode();
        let mut header_list = headers(&[("content-type", content_type.as_str())]);
        merge_headers(&mut header_list, &params.headers);

        self.finish(
            HttpMethod::Post,
            url,
            params.query.as_ref(),
            header_list,
            Some(body),
            None,
            Credentials::Include,
        )
    }

    pub fn build_download(&self, url: &str, params: &DownloadParams) -> HttpRequest {
        self.finish(
            HttpMethod::Get,
            url,
            params.query.as_ref(),
            headers(&params.headers),
            None,
            None,
            Credentials::SameOrigin,
        )
    }

    pub fn parse_json<T: DeserializeOwned>(&self, response: &HttpResponse) -> Result<T, FetchError> {
        intercept(response)
    }

    /// Turn a binary response into a `Download`.
    ///
    /// `file_type` overrides the response's own content type when non-empty.
    pub fn parse_download(&self, response: HttpResponse, file_type: &str) -> Result<Download, FetchError> {
        check_status(&response)?;
        if response.body.is_empty() {
            tracing::error!(status = response.status, "download body is empty, nothing to save");
            return Err(FetchError::EmptyBody);
        }

        let file_name = response
            .header("content-disposition")
            .and_then(filename_from_disposition)
            .unwrap_or_else(timestamp_name);
        let content_type = if !file_type.is_empty() {
            file_type.to_string()
        } else {
            response
                .header("content-type")
                .unwrap_or("application/octet-stream")
                .to_string()
        };

        Ok(Download {
            file_name,
            content_type,
            bytes: response.body,
        })
    }

    /// Prefix relative urls with the base URL.
    pub fn resolve_url(&self, url: &str) -> String {
        if Url::parse(url).is_ok() {
            url.to_string()
        } else {
            format!("{}{url}", self.config.base_url)
        }
    }

    fn same_origin(&self, url: &str) -> bool {
        let Ok(target) = Url::parse(url) else {
            return true;
        };
        match Url::parse(&self.config.base_url) {
            Ok(base) => base.origin() == target.origin(),
            Err(_) => false,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        method: HttpMethod,
        url: &str,
        query: Option<&serde_json::Map<String, serde_json::Value>>,
        mut header_list: Vec<(String, String)>,
        body: Option<Vec<u8>>,
        timeout: Option<Duration>,
        credentials: Credentials,
    ) -> HttpRequest {
        let send_cookie = match credentials {
            Credentials::Omit => false,
            Credentials::SameOrigin => self.same_origin(url),
            Credentials::Include => true,
        };
        if let (true, Some(cookie)) = (send_cookie, &self.config.cookie) {
            merge_headers(&mut header_list, &[("cookie", cookie.as_str())]);
        }

        let resolved = self.resolve_url(url);
        let url = match query {
            Some(q) => append_query(&resolved, q),
            None => resolved,
        };

        HttpRequest {
            method,
            url,
            headers: header_list,
            body,
            timeout,
            credentials,
        }
    }
}
