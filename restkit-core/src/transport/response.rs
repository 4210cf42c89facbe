use crate::error::{Error, NetworkError, ResponseError, Result};
use bytes::Bytes;
use futures_util::TryStreamExt;
use reqwest::{StatusCode, header::HeaderMap};
use tracing::warn;

use super::body::Body;

/// A response whose body has not been read yet.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Body,
}

impl Response {
    /// Assembles a response from its parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Body>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Wraps a reqwest response, streaming its body with `max_size` as limit.
    ///
    /// # Errors
    ///
    /// Fails with [`NetworkError::ResponseTooLarge`] when the announced
    /// `Content-Length` already exceeds `max_size`.
    pub(crate) fn from_reqwest(response: reqwest::Response, max_size: usize) -> Result<Self> {
        if let Some(content_length) = response.content_length()
            && content_length > max_size as u64
        {
            warn!(
                content_length = content_length,
                max_size = max_size,
                "Response exceeds size limit (Content-Length check)"
            );
            return Err(NetworkError::ResponseTooLarge {
                size: content_length,
                limit: max_size,
            }
            .into());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let stream = response.bytes_stream().map_err(Error::from);

        Ok(Self {
            status,
            headers,
            body: Body::from_stream(stream).with_limit(max_size),
        })
    }

    /// Response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Splits the response into status, headers and the unread body.
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Body) {
        (self.status, self.headers, self.body)
    }

    /// Reads the whole body.
    pub async fn bytes(self) -> Result<Bytes> {
        self.body.collect().await
    }

    /// Reads the whole body as UTF-8 text.
    pub async fn text(self) -> Result<String> {
        let bytes = self.bytes().await?;
        let text = std::str::from_utf8(&bytes).map_err(crate::error::ParseError::from)?;
        Ok(text.to_owned())
    }

    /// Buffers the body and turns the response into a [`ResponseError`].
    ///
    /// A body that cannot be read is replaced by an empty one, so the status
    /// still reaches the caller.
    pub async fn into_error(self) -> Error {
        let body = match self.body.collect().await {
            Ok(body) => body,
            Err(e) => {
                warn!(status = %self.status, error = %e, "Failed to read error response body");
                Bytes::new()
            }
        };
        ResponseError::new(self.status, self.headers, body).into()
    }
}
