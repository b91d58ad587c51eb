//! Small HTTP helper layer: JSON requests, multipart uploads and downloads.
//!
//! # Overview
//! `FetchClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network (host-does-IO pattern). `Fetcher` pairs it
//! with a `Transport` and exposes the three operations callers use:
//! `fetch_request`, `fetch_form_data` and `fetch_download_blob`.
//!
//! # Design
//! - The base URL, default timeout and cookie live in `ClientConfig`,
//!   injected at construction.
//! - Error statuses with a localized message become `FetchError::Status`;
//!   failures are logged with `tracing` and then returned, never swallowed.
//! - `UreqTransport` (feature `ureq`, on by default) is the blocking
//!   implementation; anything implementing `Transport` can replace it.

pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod fetcher;
pub mod form;
pub mod http;
pub mod intercept;
pub mod query;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_support;

pub use client::FetchClient;
pub use config::ClientConfig;
pub use download::{DirectoryTarget, Download, SaveTarget};
pub use error::FetchError;
pub use fetcher::Fetcher;
pub use form::FormData;
pub use http::{headers, merge_headers, Credentials, HttpMethod, HttpRequest, HttpResponse};
pub use intercept::{intercept, status_message};
pub use query::{append_query, format_query};
#[cfg(feature = "ureq")]
pub use transport::{UreqTransport, DEFAULT_BODY_LIMIT};
pub use transport::Transport;
pub use types::{DownloadParams, RequestParams, UploadParams};
