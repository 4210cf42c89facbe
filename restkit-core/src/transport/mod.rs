//! HTTP transport layer.
//!
//! Everything above this module talks to the network through the
//! [`Transport`] trait: submit a [`Request`], get back a [`Response`] whose
//! body has not been read yet. Transports compose as a middleware chain: a
//! [`Resource`](crate::resource::Resource) is itself a `Transport` that
//! forwards to its delegate.
//!
//! [`HttpClient`] is the `reqwest`-backed transport used by
//! [`Resource::connect`](crate::resource::Resource::connect). It provides:
//! - Timeout control per request
//! - Gzip/deflate/brotli accept-encoding negotiation
//! - Request and response size limits
//! - Proxy configuration
//! - Request and response logging with structured tracing
//!
//! It performs no retries: a failed call is reported to the caller as is.

mod body;
mod builder;
mod config;
mod endpoint;
mod headers;
mod request;
mod response;


use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

pub use body::{Body, BodyStream};
pub use builder::HttpClient;
pub use config::HttpConfig;
pub use endpoint::Endpoint;
pub use headers::{media_type, merge_headers};
pub use request::Request;
pub use response::Response;

/// Something that can carry a request to a server and hand back the response.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Submits `request`. The response body is left unread.
    async fn call(&self, request: Request) -> Result<Response>;

    /// Releases the transport. Must be safe to call more than once.
    fn close(&self) {}
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn call(&self, request: Request) -> Result<Response> {
        (**self).call(request).await
    }

    fn close(&self) {
        (**self).close();
    }
}
