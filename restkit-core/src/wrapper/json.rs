use crate::error::{ParseError, Result};
use crate::representation::Kind;
use crate::transport::media_type;
use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde_json::Value;
use std::borrow::Cow;

use super::{Wrapper, header_value, is_json};

/// `application/json`
pub const APPLICATION_JSON: &str = "application/json";

/// Newline-delimited JSON documents.
pub const APPLICATION_JSON_STREAM: &str = "application/json; boundary=NL";

/// JSON documents with a configurable content type.
///
/// Some servers use non-standard media types for JSON; those work by
/// constructing the wrapper with that type:
///
/// ```rust
/// use restkit_core::wrapper::{Json, Wrapper};
///
/// static LEGACY: Json = Json::new("application/x-javascript");
/// assert_eq!(LEGACY.accept(), "application/x-javascript");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json {
    content_type: Cow<'static, str>,
}

impl Json {
    /// A JSON wrapper producing and accepting `content_type`.
    pub const fn new(content_type: &'static str) -> Self {
        Self {
            content_type: Cow::Borrowed(content_type),
        }
    }

    /// Like [`new`](Self::new) for a content type only known at runtime.
    pub fn with_content_type(content_type: impl Into<Cow<'static, str>>) -> Self {
        Self {
            content_type: content_type.into(),
        }
    }

    /// The configured content type.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    fn accepts(&self, media_type: &str) -> bool {
        let own = self
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        media_type.eq_ignore_ascii_case(own) || is_json(media_type)
    }
}

impl Default for Json {
    fn default() -> Self {
        Self::new(APPLICATION_JSON)
    }
}

impl Wrapper for Json {
    fn accept(&self) -> &str {
        &self.content_type
    }

    fn encode(&self, payload: &Value, headers: &mut HeaderMap) -> Result<Bytes> {
        headers.insert(CONTENT_TYPE, header_value(&self.content_type)?);
        Ok(serde_json::to_vec(payload)?.into())
    }

    /// Bodies of a foreign media type are returned as a JSON string.
    fn parse(&self, headers: &HeaderMap, body: &[u8]) -> Result<Value> {
        match media_type(headers) {
            Some(media_type) if !self.accepts(&media_type) => {
                let text = std::str::from_utf8(body).map_err(ParseError::from)?;
                Ok(Value::String(text.to_owned()))
            }
            _ => Ok(serde_json::from_slice(body)?),
        }
    }
}

impl Kind for Json {
    type Wrapper = Json;

    fn wrapper() -> &'static Json {
        static JSON: Json = Json::new(APPLICATION_JSON);
        &JSON
    }
}
