//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The client
//! builds `HttpRequest` values and parses `HttpResponse` values without ever
//! touching the network; a `Transport` performs the actual round-trip.
//!
//! Headers are kept as an ordered list of `(name, value)` pairs with
//! lower-cased names, so appending a header twice yields two entries.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::FetchError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Whether a JSON payload is attached for this method.
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            _ => Err(FetchError::UnknownMethod(s.to_string())),
        }
    }
}

/// Whether ambient credentials (the configured cookie) accompany a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Credentials {
    Omit,
    #[default]
    SameOrigin,
    Include,
}

/// An HTTP request described as plain data.
///
/// Built by `FetchClient::build_*` methods and executed by a `Transport`.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    /// Deadline for the whole round-trip. `None` means the request is never
    /// cancelled by a timer.
    pub timeout: Option<Duration>,
    pub credentials: Credentials,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive lookup of the first header named `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Build a header collection from a plain mapping.
pub fn headers<K, V>(init: &[(K, V)]) -> Vec<(String, String)>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut out = Vec::with_capacity(init.len());
    merge_headers(&mut out, init);
    out
}

/// Append every header in `extra` to `target`. Existing entries with the same
/// name are kept.
pub fn merge_headers<K, V>(target: &mut Vec<(String, String)>, extra: &[(K, V)])
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    for (name, value) in extra {
        target.push((
            name.as_ref().trim().to_ascii_lowercase(),
            value.as_ref().trim().to_string(),
        ));
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
