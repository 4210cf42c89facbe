//! Content-type specific request/response translation.
//!
//! A [`Wrapper`] knows how to turn a payload into a request body (setting
//! `Content-Type`), which formats it accepts back, and how to decode a
//! response body into a [`Value`]. Wrappers are stateless beyond their
//! configuration, so one instance is shared by every representation of a
//! [`Kind`](crate::representation::Kind).
//!
//! | Wrapper        | Request body                         | Accepts                     |
//! |----------------|--------------------------------------|-----------------------------|
//! | [`Json`]       | `application/json` (configurable)    | the same media type         |
//! | [`Form`]       | `multipart/form-data`                | JSON or url-encoded         |
//! | [`UrlEncoded`] | `application/x-www-form-urlencoded`  | url-encoded                 |

mod form;
mod json;
mod url_encoded;

use crate::error::{Error, Result};
use crate::resource::Resource;
use crate::transport::{Response, Transport};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::Value;
use std::fmt;
use tracing::debug;

pub use form::Form;
pub use json::{APPLICATION_JSON, APPLICATION_JSON_STREAM, Json};
pub use url_encoded::{APPLICATION_FORM_URLENCODED, UrlEncoded};

/// Encoding and decoding for one content-type family.
#[async_trait]
pub trait Wrapper: Send + Sync + fmt::Debug + 'static {
    /// Value of the `Accept` header sent with every request.
    fn accept(&self) -> &str;

    /// Encodes `payload` into a request body and sets `Content-Type`.
    fn encode(&self, payload: &Value, headers: &mut HeaderMap) -> Result<Bytes>;

    /// Decodes a non-empty response body.
    fn parse(&self, headers: &HeaderMap, body: &[u8]) -> Result<Value>;

    /// Builds the request through `resource`, sets `Accept` unless the
    /// resource already carries one, and submits it through the resource.
    ///
    /// The response body is left unread.
    async fn call(
        &self,
        resource: &Resource,
        method: Method,
        payload: Option<&Value>,
    ) -> Result<Response> {
        let mut request =
            resource.prepare_request(method, payload, |payload, headers| {
                self.encode(payload, headers)
            })?;

        if !request.headers.contains_key(ACCEPT) {
            request.headers.insert(ACCEPT, header_value(self.accept())?);
        }

        debug!(
            method = %request.method,
            reference = %request.reference,
            accept = self.accept(),
            "Submitting request"
        );
        resource.call(request).await
    }

    /// Reads and decodes the whole response body, `None` when it is empty.
    async fn read(&self, response: Response) -> Result<Option<Value>> {
        let (_, headers, body) = response.into_parts();
        let bytes = body.collect().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        self.parse(&headers, &bytes).map(Some)
    }
}

pub(crate) fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::invalid_request(format!("invalid header value {value:?}: {e}")))
}

pub(crate) fn is_json(media_type: &str) -> bool {
    media_type == APPLICATION_JSON || media_type.ends_with("+json")
}
