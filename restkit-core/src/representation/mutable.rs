use crate::error::Result;
use crate::transport::Response;
use crate::wrapper::{Json, Wrapper};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::marker::PhantomData;
use tracing::debug;

use super::{Kind, Representation};

/// Marks a kind whose representations may be written back.
pub trait Mutable: Kind {}

/// Turns any kind into a mutable one with the same wrapper.
///
/// ```rust
/// use restkit_core::representation::{Representation, Writable};
/// use restkit_core::wrapper::Json;
///
/// type Document = Representation<Writable<Json>>;
/// ```
pub struct Writable<K = Json>(PhantomData<fn() -> K>);

impl<K: Kind> Kind for Writable<K> {
    type Wrapper = K::Wrapper;

    fn wrapper() -> &'static K::Wrapper {
        K::wrapper()
    }
}

impl<K: Kind> Mutable for Writable<K> {}

/// Write-back operations for representations of a [`Mutable`] kind.
#[async_trait]
pub trait MutableRepresentation: Send + Sync {
    /// `POST`s `value` and caches the value read back from the response.
    ///
    /// # Errors
    ///
    /// [`Error::Response`](crate::error::Error::Response) for a non-success
    /// status; the cached value is left untouched.
    async fn post(&mut self, value: Value) -> Result<&mut Self>;

    /// `DELETE`s the resource and returns the unread response. A successful
    /// response leaves the representation empty.
    async fn delete(&mut self) -> Result<Response>;

    /// Posts `value` when it is present, deletes otherwise. `null` and
    /// `false` count as absent.
    async fn assign(&mut self, value: Option<Value>) -> Result<&mut Self> {
        match value {
            Some(Value::Null | Value::Bool(false)) | None => {
                let response = self.delete().await?;
                if !response.is_success() {
                    return Err(response.into_error().await);
                }
                Ok(self)
            }
            Some(value) => self.post(value).await,
        }
    }
}

#[async_trait]
impl<K: Mutable> MutableRepresentation for Representation<K> {
    async fn post(&mut self, value: Value) -> Result<&mut Self> {
        let wrapper = K::wrapper();
        let response = wrapper
            .call(self.resource(), Method::POST, Some(&value))
            .await?;

        if !response.is_success() {
            return Err(response.into_error().await);
        }

        let metadata = response.headers().clone();
        let value = wrapper.read(response).await?;
        debug!(reference = %self.resource().reference(), "Representation posted");
        self.replace(value, metadata);
        Ok(self)
    }

    async fn delete(&mut self) -> Result<Response> {
        let response = K::wrapper()
            .call(self.resource(), Method::DELETE, None)
            .await?;

        if response.is_success() {
            debug!(reference = %self.resource().reference(), "Representation deleted");
            self.replace(None, response.headers().clone());
        }
        Ok(response)
    }
}
