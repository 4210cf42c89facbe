//! Decoding errors for response bodies.

use std::borrow::Cow;
use thiserror::Error;

/// Errors raised while turning a response body into a value.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseError {
    /// Failed to deserialize JSON.
    #[error("Failed to deserialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Body was not valid UTF-8 where text was required.
    #[error("Body is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Malformed `application/x-www-form-urlencoded` body.
    #[error("Invalid url-encoded body: {0}")]
    UrlEncoded(Cow<'static, str>),

    /// No decoder is registered for the response content type.
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),
}

impl ParseError {
    /// Creates a url-encoded parse error.
    pub fn url_encoded(message: impl Into<Cow<'static, str>>) -> Self {
        Self::UrlEncoded(message.into())
    }

    /// Creates an unsupported content type error.
    pub fn unsupported_content_type(content_type: impl Into<String>) -> Self {
        Self::UnsupportedContentType(content_type.into())
    }
}
