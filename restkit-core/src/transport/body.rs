use crate::error::{NetworkError, Result};
use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use tracing::warn;

/// A boxed stream of body chunks.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

enum Inner {
    Empty,
    Full(Bytes),
    Stream(BodyStream),
}

/// A response body that is only read when something asks for it.
pub struct Body {
    inner: Inner,
    limit: Option<usize>,
}

impl Body {
    /// A body with no content.
    pub fn empty() -> Self {
        Self {
            inner: Inner::Empty,
            limit: None,
        }
    }

    /// A body backed by a stream of chunks.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes>> + Send + 'static,
    {
        Self {
            inner: Inner::Stream(Box::pin(stream)),
            limit: None,
        }
    }

    /// Caps the number of bytes [`collect`](Self::collect) will accept.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Exact length when it is known without reading.
    pub fn size_hint(&self) -> Option<u64> {
        match &self.inner {
            Inner::Empty => Some(0),
            Inner::Full(bytes) => Some(bytes.len() as u64),
            Inner::Stream(_) => None,
        }
    }

    /// Reads the whole body into memory.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::ResponseTooLarge`] when the body exceeds the
    /// configured limit, or the stream's own error.
    pub async fn collect(self) -> Result<Bytes> {
        let limit = self.limit.unwrap_or(usize::MAX);

        match self.inner {
            Inner::Empty => Ok(Bytes::new()),
            Inner::Full(bytes) => {
                if bytes.len() > limit {
                    return Err(too_large(bytes.len(), limit));
                }
                Ok(bytes)
            }
            Inner::Stream(mut stream) => {
                let mut body = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk?;
                    let accumulated = body.len().saturating_add(chunk.len());
                    if accumulated > limit {
                        warn!(
                            accumulated_size = accumulated,
                            max_size = limit,
                            "Response exceeds size limit during streaming"
                        );
                        return Err(too_large(accumulated, limit));
                    }
                    body.extend_from_slice(&chunk);
                }
                Ok(body.freeze())
            }
        }
    }
}

fn too_large(size: usize, limit: usize) -> crate::error::Error {
    NetworkError::ResponseTooLarge {
        size: size as u64,
        limit,
    }
    .into()
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Inner::Empty => f.write_str("Body(empty)"),
            Inner::Full(bytes) => write!(f, "Body({} bytes)", bytes.len()),
            Inner::Stream(_) => f.write_str("Body(stream)"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        if bytes.is_empty() {
            return Self::empty();
        }
        Self {
            inner: Inner::Full(bytes),
            limit: None,
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes::from(bytes).into()
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Bytes::from(text).into()
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Bytes::from_static(text.as_bytes()).into()
    }
}

impl From<Option<Bytes>> for Body {
    fn from(bytes: Option<Bytes>) -> Self {
        bytes.map_or_else(Self::empty, Self::from)
    }
}
