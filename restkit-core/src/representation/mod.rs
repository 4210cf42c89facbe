//! Lazily fetched, cached representations of a resource.
//!
//! A [`Representation`] pairs a [`Resource`] with the value and metadata
//! (response headers) of that resource at one point in time. The value is
//! fetched on first access through the wrapper of the representation's
//! [`Kind`] and cached for the lifetime of the instance.
//!
//! ```rust,no_run
//! use restkit_core::prelude::*;
//!
//! # async fn run(resource: Resource) -> restkit_core::Result<()> {
//! let items: Representation = Representation::new(resource.with_path("items"));
//! assert!(!items.has_value());
//!
//! let first = items.with_parameters([("page", 1)]);
//! println!("{}", first.value().await?);
//! # Ok(())
//! # }
//! ```
//!
//! Concurrent first accesses of [`Representation::value`] share one fetch.
//! A failed fetch caches nothing, so the next access tries again.

mod mutable;

#[cfg(test)]
mod tests;

use crate::error::{Error, Result};
use crate::reference::{Parameters, Scope};
use crate::resource::Resource;
use crate::transport::Response;
use crate::wrapper::{Json, Wrapper};
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::LazyLock;
use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};

pub use mutable::{Mutable, MutableRepresentation, Writable};

static NULL: Value = Value::Null;
static NO_METADATA: LazyLock<HeaderMap> = LazyLock::new(HeaderMap::new);

/// Binds a representation type to the wrapper that encodes and decodes it.
///
/// Every representation of one kind, and every representation derived from
/// it, shares the same wrapper instance.
///
/// ```rust
/// use restkit_core::representation::Kind;
/// use restkit_core::wrapper::Json;
///
/// struct Legacy;
///
/// impl Kind for Legacy {
///     type Wrapper = Json;
///
///     fn wrapper() -> &'static Json {
///         static LEGACY: Json = Json::new("application/x-javascript");
///         &LEGACY
///     }
/// }
/// ```
pub trait Kind: 'static {
    /// The wrapper type.
    type Wrapper: Wrapper;

    /// The shared wrapper instance.
    fn wrapper() -> &'static Self::Wrapper;
}

/// What a representation knows about its value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueState<'a> {
    /// Nothing has been fetched yet.
    Unfetched,
    /// Fetched, and the body was empty.
    Empty,
    /// Fetched (or given) value.
    Value(&'a Value),
}

struct Snapshot {
    value: Option<Value>,
    metadata: HeaderMap,
}

/// A resource's value and metadata, fetched at most once.
///
/// `K` selects the wrapper used for every request the representation makes.
pub struct Representation<K: Kind = Json> {
    resource: Resource,
    snapshot: OnceCell<Snapshot>,
    kind: PhantomData<fn() -> K>,
}

impl<K: Kind> Representation<K> {
    /// A representation whose value is fetched on first access.
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            snapshot: OnceCell::new(),
            kind: PhantomData,
        }
    }

    /// A representation with an already known value and metadata. No fetch
    /// will ever be made for it.
    pub fn from_parts(resource: Resource, value: Option<Value>, metadata: HeaderMap) -> Self {
        Self {
            resource,
            snapshot: OnceCell::from(Snapshot { value, metadata }),
            kind: PhantomData,
        }
    }

    /// Reads `response` as the value and its headers as metadata.
    ///
    /// The status is not checked.
    pub async fn from_response(resource: Resource, response: Response) -> Result<Self> {
        let metadata = response.headers().clone();
        let value = K::wrapper().read(response).await?;
        Ok(Self::from_parts(resource, value, metadata))
    }

    /// Submits `method` with `payload` through the kind's wrapper and builds
    /// a representation from the response.
    pub async fn call(resource: &Resource, method: Method, payload: Option<&Value>) -> Result<Self> {
        let response = K::wrapper().call(resource, method, payload).await?;
        Self::from_response(resource.clone(), response).await
    }

    /// Like [`call`](Self::call), but `build` decides what to make of the
    /// response.
    pub async fn call_with<F, Fut, T>(
        resource: &Resource,
        method: Method,
        payload: Option<&Value>,
        build: F,
    ) -> Result<T>
    where
        F: FnOnce(Resource, Response) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let response = K::wrapper().call(resource, method, payload).await?;
        build(resource.clone(), response).await
    }

    /// `GET`
    pub async fn get(resource: &Resource, payload: Option<&Value>) -> Result<Self> {
        Self::call(resource, Method::GET, payload).await
    }

    /// `POST`
    pub async fn post(resource: &Resource, payload: Option<&Value>) -> Result<Self> {
        Self::call(resource, Method::POST, payload).await
    }

    /// `PUT`
    pub async fn put(resource: &Resource, payload: Option<&Value>) -> Result<Self> {
        Self::call(resource, Method::PUT, payload).await
    }

    /// `PATCH`
    pub async fn patch(resource: &Resource, payload: Option<&Value>) -> Result<Self> {
        Self::call(resource, Method::PATCH, payload).await
    }

    /// `DELETE`
    pub async fn delete(resource: &Resource, payload: Option<&Value>) -> Result<Self> {
        Self::call(resource, Method::DELETE, payload).await
    }

    /// `HEAD`
    pub async fn head(resource: &Resource, payload: Option<&Value>) -> Result<Self> {
        Self::call(resource, Method::HEAD, payload).await
    }

    /// `OPTIONS`
    pub async fn options(resource: &Resource, payload: Option<&Value>) -> Result<Self> {
        Self::call(resource, Method::OPTIONS, payload).await
    }

    /// The underlying resource.
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Derives an unfetched representation of the same kind for a narrower
    /// resource.
    #[must_use]
    pub fn with(&self, scope: Scope) -> Representation<K> {
        Representation::new(self.resource.with(scope))
    }

    /// Like [`with`](Self::with), switching to kind `K2`.
    #[must_use]
    pub fn with_kind<K2: Kind>(&self, scope: Scope) -> Representation<K2> {
        Representation::new(self.resource.with(scope))
    }

    /// Derives a representation with additional query parameters.
    #[must_use]
    pub fn with_parameters(&self, parameters: impl Into<Parameters>) -> Representation<K> {
        self.with(Scope::from(parameters.into()))
    }

    /// The value, fetching it with `GET` on first access.
    ///
    /// An empty body yields `Value::Null`; use [`state`](Self::state) to
    /// tell it apart from a literal `null`.
    ///
    /// # Errors
    ///
    /// Transport and decoding errors, and [`Error::Response`] for a
    /// non-success status. Nothing is cached on error.
    pub async fn value(&self) -> Result<&Value> {
        let snapshot = self.snapshot.get_or_try_init(|| self.fetch()).await?;
        Ok(snapshot.value.as_ref().unwrap_or(&NULL))
    }

    /// Fetches if needed and deserializes the value into `T`.
    pub async fn value_as<T: DeserializeOwned>(&self) -> Result<T> {
        let value = self.value().await?;
        T::deserialize(value).map_err(Error::from)
    }

    /// `true` once a value has been fetched or given. Never fetches.
    pub fn has_value(&self) -> bool {
        self.snapshot.initialized()
    }

    /// Tri-state view of the cached value. Never fetches.
    pub fn state(&self) -> ValueState<'_> {
        match self.snapshot.get() {
            None => ValueState::Unfetched,
            Some(Snapshot { value: None, .. }) => ValueState::Empty,
            Some(Snapshot {
                value: Some(value), ..
            }) => ValueState::Value(value),
        }
    }

    /// Headers of the response the value came from. Empty until fetched.
    pub fn metadata(&self) -> &HeaderMap {
        self.snapshot
            .get()
            .map_or(&*NO_METADATA, |snapshot| &snapshot.metadata)
    }

    /// Closes the underlying resource.
    pub fn close(&self) {
        self.resource.close();
    }

    pub(crate) fn replace(&mut self, value: Option<Value>, metadata: HeaderMap) {
        self.snapshot = OnceCell::from(Snapshot { value, metadata });
    }

    #[instrument(
        name = "representation_fetch",
        skip(self),
        fields(reference = %self.resource.reference())
    )]
    async fn fetch(&self) -> Result<Snapshot> {
        let wrapper = K::wrapper();
        let response = wrapper.call(&self.resource, Method::GET, None).await?;

        if !response.is_success() {
            warn!(status = %response.status(), "Fetch returned non-success status");
            return Err(response.into_error().await);
        }

        let metadata = response.headers().clone();
        let value = wrapper.read(response).await?;
        debug!(empty = value.is_none(), "Representation fetched");

        Ok(Snapshot { value, metadata })
    }
}

impl<K: Kind> fmt::Debug for Representation<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Representation")
            .field("kind", &std::any::type_name::<K>())
            .field("reference", &self.resource.reference().to_string())
            .field("state", &self.state())
            .finish()
    }
}
