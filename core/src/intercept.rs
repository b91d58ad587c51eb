//! Response interceptor: turns an `HttpResponse` into a parsed body or a
//! `FetchError`.

use serde::de::DeserializeOwned;

use crate::error::FetchError;
use crate::http::HttpResponse;

/// Localized messages for the statuses callers are expected to surface.
const STATUS_MESSAGES: &[(u16, &str)] = &[
    (400, "请求参数错误"),
    (403, "无权访问"),
    (404, "资源不存在"),
    (413, "上传文件过大"),
    (500, "服务器内部错误"),
];

pub fn status_message(status: u16) -> Option<&'static str> {
    STATUS_MESSAGES
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, message)| *message)
}

/// Parse the body of a 2xx response as JSON, or map the status to an error.
pub fn intercept<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, FetchError> {
    check_status(response)?;
    serde_json::from_slice(&response.body)
        .map_err(|e| FetchError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `FetchError` variant.
pub(crate) fn check_status(response: &HttpResponse) -> Result<(), FetchError> {
    if response.is_ok() {
        return Ok(());
    }
    if response.status == 403 {
        tracing::info!(status = 403, "access denied by server");
    }
    match status_message(response.status) {
        Some(message) => Err(FetchError::Status {
            status: response.status,
            message,
        }),
        None => Err(FetchError::UnexpectedStatus {
            status: response.status,
            body: response.body_text(),
        }),
    }
}
