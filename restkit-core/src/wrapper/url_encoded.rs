use crate::error::{Error, ParseError, Result};
use crate::representation::Kind;
use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde_json::{Map, Value};
use url::form_urlencoded;

use super::{Wrapper, header_value};

/// `application/x-www-form-urlencoded`
pub const APPLICATION_FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Url-encoded forms with bracketed nesting.
///
/// Objects nest as `a[b]=c`, arrays as `a[]=1&a[]=2`. Scalars are rendered
/// as text and decode back as strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrlEncoded;

impl Wrapper for UrlEncoded {
    fn accept(&self) -> &str {
        APPLICATION_FORM_URLENCODED
    }

    fn encode(&self, payload: &Value, headers: &mut HeaderMap) -> Result<Bytes> {
        headers.insert(CONTENT_TYPE, header_value(APPLICATION_FORM_URLENCODED)?);
        Ok(encode(payload)?.into())
    }

    fn parse(&self, _headers: &HeaderMap, body: &[u8]) -> Result<Value> {
        decode(body)
    }
}

impl Kind for UrlEncoded {
    type Wrapper = UrlEncoded;

    fn wrapper() -> &'static UrlEncoded {
        static URL_ENCODED: UrlEncoded = UrlEncoded;
        &URL_ENCODED
    }
}

/// Flattens an object into `(key, value)` pairs with bracketed keys.
pub(crate) fn flatten(payload: &Value) -> Result<Vec<(String, String)>> {
    let Value::Object(fields) = payload else {
        return Err(Error::invalid_request(
            "form payload must be an object of fields",
        ));
    };

    let mut pairs = Vec::new();
    for (name, value) in fields {
        flatten_into(name.clone(), value, &mut pairs);
    }
    Ok(pairs)
}

fn flatten_into(prefix: String, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Object(fields) => {
            for (name, value) in fields {
                flatten_into(format!("{prefix}[{name}]"), value, pairs);
            }
        }
        Value::Array(items) => {
            for item in items {
                flatten_into(format!("{prefix}[]"), item, pairs);
            }
        }
        Value::Null => pairs.push((prefix, String::new())),
        Value::String(text) => pairs.push((prefix, text.clone())),
        other => pairs.push((prefix, other.to_string())),
    }
}

pub(crate) fn encode(payload: &Value) -> Result<String> {
    let pairs = flatten(payload)?;
    Ok(form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish())
}

pub(crate) fn decode(body: &[u8]) -> Result<Value> {
    let mut root = Map::new();
    for (key, value) in form_urlencoded::parse(body) {
        let segments = split_key(&key);
        insert(&mut root, &segments, value.into_owned())?;
    }
    Ok(Value::Object(root))
}

/// `a[b][]` becomes `["a", "b", ""]`. Malformed keys are kept whole.
fn split_key(key: &str) -> Vec<&str> {
    let Some(open) = key.find('[') else {
        return vec![key];
    };
    if open == 0 {
        return vec![key];
    }

    let mut segments = vec![&key[..open]];
    let mut rest = &key[open..];
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return vec![key];
        };
        let Some(close) = inner.find(']') else {
            return vec![key];
        };
        segments.push(&inner[..close]);
        rest = &inner[close + 1..];
    }
    segments
}

fn insert(target: &mut Map<String, Value>, segments: &[&str], value: String) -> Result<()> {
    let (name, rest) = match segments {
        [] => return Ok(()),
        [name, rest @ ..] => (*name, rest),
    };

    match rest {
        [] => {
            target.insert(name.to_owned(), Value::String(value));
        }
        ["", tail @ ..] => {
            let entry = target
                .entry(name.to_owned())
                .or_insert_with(|| Value::Array(Vec::new()));
            let Value::Array(items) = entry else {
                return Err(conflict(name));
            };
            push_item(items, tail, value)?;
        }
        _ => {
            let entry = target
                .entry(name.to_owned())
                .or_insert_with(|| Value::Object(Map::new()));
            let Value::Object(fields) = entry else {
                return Err(conflict(name));
            };
            insert(fields, rest, value)?;
        }
    }
    Ok(())
}

/// `a[]=x` appends a string; `a[][k]=x` fills the last object until `k`
/// repeats, then starts a new one.
fn push_item(items: &mut Vec<Value>, tail: &[&str], value: String) -> Result<()> {
    let Some(key) = tail.first() else {
        items.push(Value::String(value));
        return Ok(());
    };

    let reuse_last = match items.last() {
        Some(Value::Object(fields)) => match fields.get(*key) {
            None => true,
            Some(Value::Object(_)) => tail.len() > 1,
            Some(_) => false,
        },
        _ => false,
    };
    if !reuse_last {
        items.push(Value::Object(Map::new()));
    }

    match items.last_mut() {
        Some(Value::Object(fields)) => insert(fields, tail, value),
        _ => Err(conflict(key)),
    }
}

fn conflict(name: &str) -> Error {
    ParseError::url_encoded(format!("conflicting shapes for key '{name}'")).into()
}
