//! Addressable resources.
//!
//! A [`Resource`] is a transport delegate plus a [`Reference`] and a set of
//! default headers. It never mutates: [`Resource::with`] returns a new,
//! narrower resource sharing the same delegate.
//!
//! Only the resource returned by [`Resource::open`] owns its delegate.
//! Clones and derived resources share it but never close it;
//! [`Resource::scoped`] closes the transport it opened by itself.

use crate::error::{Error, Result};
use crate::reference::{Parameters, Reference, Scope};
use crate::representation::{Kind, Representation};
use crate::transport::{
    Endpoint, HttpClient, HttpConfig, Request, Response, Transport, merge_headers,
};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use reqwest::header::HeaderMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A network entity reachable through a transport at a reference.
pub struct Resource {
    delegate: Arc<dyn Transport>,
    reference: Reference,
    headers: HeaderMap,
    owner: bool,
}

impl Resource {
    /// Wraps an existing delegate. The resource does not own the delegate and
    /// will not close it.
    pub fn new(delegate: Arc<dyn Transport>, reference: Reference, headers: HeaderMap) -> Self {
        Self {
            delegate,
            reference,
            headers,
            owner: false,
        }
    }

    /// Opens an HTTP transport for `endpoint` and parses its path into the
    /// base reference.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or the client cannot be built.
    pub fn connect(endpoint: &Endpoint, config: HttpConfig) -> Result<(Arc<dyn Transport>, Reference)> {
        let client = HttpClient::new(endpoint, config)?;
        Ok((Arc::new(client), endpoint.reference()))
    }

    /// Connects to `url` with [`HttpConfig::from_env`] and returns a resource
    /// that owns the transport.
    ///
    /// ```rust,no_run
    /// use restkit_core::prelude::*;
    ///
    /// # async fn run() -> restkit_core::Result<()> {
    /// let resource = Resource::open("https://dns.google.com/resolve")?;
    /// let query = resource
    ///     .get::<Json>([("name", "example.com"), ("type", "AAAA")])
    ///     .await?;
    /// println!("{}", query.value().await?);
    /// resource.close();
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(url: &str) -> Result<Self> {
        Self::open_with(Endpoint::parse(url)?, HttpConfig::from_env())
    }

    /// Like [`open`](Self::open) with an explicit configuration.
    pub fn open_with(endpoint: Endpoint, config: HttpConfig) -> Result<Self> {
        let (delegate, reference) = Self::connect(&endpoint, config)?;
        Ok(Self {
            delegate,
            reference,
            headers: HeaderMap::new(),
            owner: true,
        })
    }

    /// Connects to `url`, runs `f` with the resource and closes the transport
    /// afterwards.
    ///
    /// The transport is closed when `f` returns, when it fails and when the
    /// returned future is dropped before completion.
    pub async fn scoped<F, Fut, T>(url: &str, f: F) -> Result<T>
    where
        F: FnOnce(Resource) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        Self::scoped_with(Endpoint::parse(url)?, HttpConfig::from_env(), f).await
    }

    /// Like [`scoped`](Self::scoped) with an explicit configuration.
    pub async fn scoped_with<F, Fut, T>(endpoint: Endpoint, config: HttpConfig, f: F) -> Result<T>
    where
        F: FnOnce(Resource) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let (delegate, reference) = Self::connect(&endpoint, config)?;
        let _guard = CloseGuard(Arc::clone(&delegate));
        f(Resource::new(delegate, reference, HeaderMap::new())).await
    }

    /// The resource's reference.
    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    /// Path of the resource's reference.
    pub fn path(&self) -> &str {
        self.reference.path()
    }

    /// Default headers sent with every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The shared transport delegate.
    pub fn delegate(&self) -> &Arc<dyn Transport> {
        &self.delegate
    }

    /// Derives a narrower resource sharing this one's delegate.
    ///
    /// The scope is merged into the reference, and its headers override the
    /// default headers of the same name.
    #[must_use]
    pub fn with(&self, scope: Scope) -> Resource {
        Resource {
            delegate: Arc::clone(&self.delegate),
            reference: self.reference.with(&scope),
            headers: merge_headers(&self.headers, &scope.headers),
            owner: false,
        }
    }

    /// Derives a resource with additional query parameters.
    #[must_use]
    pub fn with_parameters(&self, parameters: impl Into<Parameters>) -> Resource {
        self.with(Scope::from(parameters.into()))
    }

    /// Derives a resource at `path`, resolved against the current path.
    #[must_use]
    pub fn with_path(&self, path: impl Into<String>) -> Resource {
        self.with(Scope::new().path(path))
    }

    /// Derives a resource with additional default headers.
    #[must_use]
    pub fn with_headers(&self, headers: HeaderMap) -> Resource {
        self.with(Scope::new().headers(headers))
    }

    /// Derives a resource scoped by `parameters`, wraps it in a
    /// representation of kind `K` and fetches its value before returning.
    ///
    /// # Errors
    ///
    /// Any error of the fetch, including a non-success response.
    pub async fn get<K: Kind>(&self, parameters: impl Into<Parameters>) -> Result<Representation<K>> {
        let representation = Representation::<K>::new(self.with_parameters(parameters));
        representation.value().await?;
        Ok(representation)
    }

    /// Builds a request for this resource.
    ///
    /// With a payload, `encoder` receives a copy of the default headers it
    /// may extend (e.g. with `Content-Type`) and returns the body. Without
    /// one, the default headers are used as is and no body is sent.
    ///
    /// # Errors
    ///
    /// Whatever `encoder` fails with.
    pub fn prepare_request<P, F>(&self, method: Method, payload: Option<&P>, encoder: F) -> Result<Request>
    where
        P: ?Sized,
        F: FnOnce(&P, &mut HeaderMap) -> Result<Bytes>,
    {
        let request = match payload {
            Some(payload) => {
                let mut headers = self.headers.clone();
                let body = encoder(payload, &mut headers)?;
                Request::new(method, self.reference.clone(), headers).with_body(body)
            }
            None => Request::new(method, self.reference.clone(), self.headers.clone()),
        };
        Ok(request)
    }

    /// Closes the delegate if this resource owns it. Safe to call repeatedly.
    pub fn close(&self) {
        if self.owner {
            debug!(reference = %self.reference, "Closing resource");
            self.delegate.close();
        }
    }
}

impl Clone for Resource {
    /// The clone shares the delegate but does not own it.
    fn clone(&self) -> Self {
        Self {
            delegate: Arc::clone(&self.delegate),
            reference: self.reference.clone(),
            headers: self.headers.clone(),
            owner: false,
        }
    }
}

#[async_trait]
impl Transport for Resource {
    #[instrument(
        name = "resource_call",
        skip(self, request),
        fields(method = %request.method, reference = %request.reference)
    )]
    async fn call(&self, request: Request) -> Result<Response> {
        self.delegate.call(request).await
    }

    fn close(&self) {
        Resource::close(self);
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resource({})", self.reference)
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("reference", &self.reference.to_string())
            .field("headers", &self.headers)
            .field("owner", &self.owner)
            .finish()
    }
}

impl TryFrom<&str> for Resource {
    type Error = Error;

    fn try_from(url: &str) -> Result<Self> {
        Self::open(url)
    }
}

struct CloseGuard(Arc<dyn Transport>);

impl Drop for CloseGuard {
    fn drop(&mut self) {
        self.0.close();
    }
}
