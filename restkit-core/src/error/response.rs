//! Non-success response details.

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use std::fmt;

/// Maximum number of body bytes rendered by `Display`.
const BODY_PREVIEW_SIZE: usize = 200;

/// A response whose status was not in the success range.
///
/// The body is buffered so the error stays `Send + Sync` and can be
/// inspected after the connection is gone.
#[derive(Debug, Clone)]
pub struct ResponseError {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ResponseError {
    /// Creates a response error from its parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code returned by the server.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw response body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Response body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if !self.body.is_empty() {
            let end = self.body.len().min(BODY_PREVIEW_SIZE);
            write!(f, ": {}", String::from_utf8_lossy(&self.body[..end]))?;
        }
        Ok(())
    }
}

impl std::error::Error for ResponseError {}
