//! Executing `HttpRequest` values.
//!
//! `Transport` is the only place I/O happens. `UreqTransport` is the default
//! implementation; tests can pass a closure instead.

use crate::error::FetchError;
use crate::http::{HttpRequest, HttpResponse};

pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, FetchError>,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        self(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::blocking::{UreqTransport, DEFAULT_BODY_LIMIT};

#[cfg(feature = "ureq")]
mod blocking {
    use std::time::Duration;

    use ureq::http;
    use ureq::{Agent, AsSendBody, Body};
    use url::Url;

    use super::Transport;
    use crate::error::FetchError;
    use crate::http::{HttpRequest, HttpResponse};

    /// Default cap on a buffered response body (64 MiB).
    pub const DEFAULT_BODY_LIMIT: u64 = 64 * 1024 * 1024;

    /// Blocking transport backed by a `ureq::Agent`.
    ///
    /// Status codes are returned as data rather than `Err`, leaving status
    /// interpretation to the interceptor. A request's `timeout` becomes a
    /// global deadline covering connect, send and the full body read.
    ///
    /// Bodies are buffered whole, up to `body_limit` bytes
    /// (`DEFAULT_BODY_LIMIT` unless changed with `with_body_limit`). A
    /// larger body fails as `FetchError::Transport`.
    #[derive(Debug, Clone)]
    pub struct UreqTransport {
        agent: Agent,
        body_limit: u64,
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl UreqTransport {
        pub fn new() -> Self {
            let agent = Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent();
            Self::with_agent(agent)
        }

        pub fn with_agent(agent: Agent) -> Self {
            Self {
                agent,
                body_limit: DEFAULT_BODY_LIMIT,
            }
        }

        /// Maximum number of response bytes to buffer. `u64::MAX` removes
        /// the cap.
        pub fn with_body_limit(mut self, bytes: u64) -> Self {
            self.body_limit = bytes;
            self
        }

        pub fn body_limit(&self) -> u64 {
            self.body_limit
        }

        fn run<S: AsSendBody>(
            &self,
            request: http::Request<S>,
            timeout: Option<Duration>,
        ) -> Result<http::Response<Body>, ureq::Error> {
            let request = self
                .agent
                .configure_request(request)
                .timeout_global(timeout)
                .build();
            self.agent.run(request)
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
            if let Err(e) = Url::parse(&request.url) {
                return Err(FetchError::InvalidUrl {
                    url: request.url.clone(),
                    reason: e.to_string(),
                });
            }

            let uri = http::Uri::try_from(request.url.as_str()).map_err(|e| FetchError::InvalidUrl {
                url: request.url.clone(),
                reason: e.to_string(),
            })?;

            let mut builder = http::Request::builder()
                .method(request.method.as_str())
                .uri(uri);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }

            // the uri is already valid, so what remains are header problems
            let invalid = |e: http::Error| FetchError::InvalidRequest(e.to_string());
            let result = match &request.body {
                Some(body) => self.run(builder.body(body.clone()).map_err(invalid)?, request.timeout),
                None => self.run(builder.body(()).map_err(invalid)?, request.timeout),
            };
            let mut response = result.map_err(|e| map_error(e, request.timeout))?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            let body = response
                .body_mut()
                .with_config()
                .limit(self.body_limit)
                .read_to_vec()
                .map_err(|e| map_error(e, request.timeout))?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }

    fn map_error(err: ureq::Error, timeout: Option<Duration>) -> FetchError {
        match err {
            ureq::Error::Timeout(_) => FetchError::Timeout(timeout.unwrap_or_default()),
            other => FetchError::Transport(other.to_string()),
        }
    }
}
