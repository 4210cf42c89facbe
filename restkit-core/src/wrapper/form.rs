use crate::error::{ParseError, Result};
use crate::representation::Kind;
use crate::transport::media_type;
use bytes::{BufMut, Bytes, BytesMut};
use rand::Rng;
use rand::distr::Alphanumeric;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde_json::Value;

use super::url_encoded::{self, APPLICATION_FORM_URLENCODED};
use super::{Wrapper, header_value, is_json};

const BOUNDARY_LEN: usize = 24;

/// `multipart/form-data` submissions.
///
/// Fields are flattened with the same bracketed nesting as
/// [`UrlEncoded`](super::UrlEncoded). Responses are decoded as JSON or as a
/// url-encoded form depending on their `Content-Type`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Form;

impl Form {
    fn boundary() -> String {
        let token: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(BOUNDARY_LEN)
            .map(char::from)
            .collect();
        format!("----restkit{token}")
    }
}

impl Wrapper for Form {
    fn accept(&self) -> &str {
        "application/json, application/x-www-form-urlencoded"
    }

    fn encode(&self, payload: &Value, headers: &mut HeaderMap) -> Result<Bytes> {
        let fields = url_encoded::flatten(payload)?;
        let boundary = Self::boundary();

        let mut body = BytesMut::new();
        for (name, value) in &fields {
            body.put_slice(format!("--{boundary}\r\n").as_bytes());
            body.put_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    escape_name(name)
                )
                .as_bytes(),
            );
            body.put_slice(value.as_bytes());
            body.put_slice(b"\r\n");
        }
        body.put_slice(format!("--{boundary}--\r\n").as_bytes());

        headers.insert(
            CONTENT_TYPE,
            header_value(&format!("multipart/form-data; boundary={boundary}"))?,
        );
        Ok(body.freeze())
    }

    fn parse(&self, headers: &HeaderMap, body: &[u8]) -> Result<Value> {
        match media_type(headers).as_deref() {
            Some(APPLICATION_FORM_URLENCODED) => url_encoded::decode(body),
            Some(media_type) if !is_json(media_type) => {
                Err(ParseError::unsupported_content_type(media_type).into())
            }
            _ => Ok(serde_json::from_slice(body)?),
        }
    }
}

impl Kind for Form {
    type Wrapper = Form;

    fn wrapper() -> &'static Form {
        static FORM: Form = Form;
        &FORM
    }
}

fn escape_name(name: &str) -> String {
    name.replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
