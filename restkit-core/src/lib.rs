//! restkit core library
//!
//! Client-side building blocks for RESTful HTTP services:
//!
//! - [`Resource`](resource::Resource): a transport delegate, a reference and
//!   default headers. Immutable; narrower resources are derived with `with`.
//! - [`Representation`](representation::Representation): the lazily fetched
//!   and cached value of a resource, plus the response headers it came with.
//! - [`Wrapper`](wrapper::Wrapper): content-type specific encoding and
//!   decoding (JSON, multipart form, url-encoded).
//!
//! # Example
//!
//! ```rust,no_run
//! use restkit_core::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! Resource::scoped("https://example.test/items", |resource| async move {
//!     let item = resource.get::<Json>([("id", 42)]).await?;
//!     println!("{}", item.value().await?);
//!     Ok::<_, Error>(())
//! })
//! .await
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::return_self_not_must_use)]

// Re-exports of external dependencies
pub use bytes;
pub use reqwest::{Method, StatusCode, header};
pub use serde_json;

pub mod config;
pub mod error;
pub mod logging;
pub mod reference;
pub mod representation;
pub mod resource;
pub mod transport;
pub mod wrapper;

pub use config::ProxyConfig;
pub use error::{ContextExt, Error, NetworkError, ParseError, ResponseError, Result};
pub use reference::{Parameters, Reference, Scope};
pub use representation::{
    Kind, Mutable, MutableRepresentation, Representation, ValueState, Writable,
};
pub use resource::Resource;
pub use transport::{Body, Endpoint, HttpClient, HttpConfig, Request, Response, Transport};
pub use wrapper::{Form, Json, UrlEncoded, Wrapper};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Prelude module for convenient imports
///
/// ```rust
/// use restkit_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{ContextExt, Error, Result};
    pub use crate::logging::{LogConfig, LogFormat, LogLevel, init_logging, try_init_logging};
    pub use crate::reference::{Parameters, Reference, Scope};
    pub use crate::representation::{
        Kind, Mutable, MutableRepresentation, Representation, ValueState, Writable,
    };
    pub use crate::resource::Resource;
    pub use crate::transport::{Endpoint, HttpConfig, Request, Response, Transport};
    pub use crate::wrapper::{Form, Json, UrlEncoded, Wrapper};
    pub use reqwest::{Method, StatusCode};
    pub use serde_json::{Value, json};
}
