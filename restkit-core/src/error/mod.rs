//! # Error Handling for restkit
//!
//! Every fallible operation in this crate returns [`Result<T>`], whose error
//! type is the [`Error`] enum below. Errors are never retried or swallowed by
//! this layer: they propagate to the immediate caller.
//!
//! ## Error Hierarchy
//!
//! ```text
//! Error
//! ├── Network        - Transport errors, surfaced unmodified (via NetworkError)
//! ├── Response       - Non-success response, carries status/headers/body
//! ├── Parse          - Response body could not be decoded (via ParseError)
//! ├── InvalidRequest - Payload could not be encoded into a request
//! ├── InvalidEndpoint - Endpoint URL could not be parsed
//! ├── Configuration  - Invalid transport configuration
//! ├── Timeout        - Operation timeout
//! └── Context        - Error with additional context
//! ```
//!
//! ## Inspecting a failed fetch
//!
//! ```rust
//! use restkit_core::error::{Error, ResponseError};
//! use reqwest::StatusCode;
//!
//! fn describe(err: &Error) -> String {
//!     match err.as_response() {
//!         Some(response) => format!("server said {}", response.status()),
//!         None => err.report(),
//!     }
//! }
//!
//! let err = Error::from(ResponseError::new(
//!     StatusCode::NOT_FOUND,
//!     Default::default(),
//!     "missing".into(),
//! ));
//! assert_eq!(describe(&err), "server said 404 Not Found");
//! ```

mod config;
mod context;
mod convert;
mod network;
mod parse;
mod response;

use reqwest::StatusCode;
use std::borrow::Cow;
use std::error::Error as StdError;
use thiserror::Error;

pub use config::{ConfigValidationError, ValidationResult};
pub use context::ContextExt;
pub use network::NetworkError;
pub use parse::ParseError;
pub use response::ResponseError;

/// Result type alias for all restkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The primary error type for restkit.
///
/// Large variants are boxed to keep the enum small.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Transport-level failure. Boxed to reduce enum size.
    #[error("Network error: {0}")]
    Network(Box<NetworkError>),

    /// The server answered with a non-success status.
    #[error("Response error: {0}")]
    Response(Box<ResponseError>),

    /// The response body could not be decoded. Boxed to reduce enum size.
    #[error("Parse error: {0}")]
    Parse(Box<ParseError>),

    /// The request could not be built from the given payload.
    #[error("Invalid request: {0}")]
    InvalidRequest(Cow<'static, str>),

    /// The endpoint could not be parsed or is not usable.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(Cow<'static, str>),

    /// Transport configuration failed validation.
    /// Boxed to reduce enum size.
    #[error("Configuration error: {0}")]
    Configuration(Box<ConfigValidationError>),

    /// Operation timeout.
    #[error("Timeout: {0}")]
    Timeout(Cow<'static, str>),

    /// Error with additional context, preserving the error chain.
    #[error("{context}")]
    Context {
        /// Context message describing what operation failed
        context: String,
        /// The underlying error
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Creates a network error from a message.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(Box::new(NetworkError::ConnectionFailed(msg.into())))
    }

    /// Creates an invalid request error.
    /// Accepts both `&'static str` (zero allocation) and `String`.
    pub fn invalid_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Creates an invalid endpoint error.
    pub fn invalid_endpoint(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidEndpoint(msg.into())
    }

    /// Creates a timeout error.
    pub fn timeout(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Creates the error returned by a transport that has been closed.
    pub fn closed() -> Self {
        Self::Network(Box::new(NetworkError::Closed))
    }

    /// Attaches context to an existing error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use restkit_core::error::Error;
    ///
    /// let err = Error::network("Connection refused")
    ///     .context("Failed to fetch /items");
    /// assert!(err.report().contains("Connection refused"));
    /// ```
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    fn iter_chain(&self) -> impl Iterator<Item = &Error> {
        std::iter::successors(Some(self), |err| match err {
            Error::Context { source, .. } => Some(source.as_ref()),
            _ => None,
        })
    }

    /// Returns the root cause of the error, skipping Context layers.
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        self.iter_chain().last().unwrap_or(self)
    }

    /// Generates a detailed error report with the full chain.
    #[must_use]
    pub fn report(&self) -> String {
        use std::fmt::Write;
        let mut report = String::new();
        report.push_str(&self.to_string());

        let mut current: Option<&(dyn StdError + 'static)> = self.source();
        while let Some(err) = current {
            let _ = write!(report, "\nCaused by: {err}");
            current = err.source();
        }
        report
    }

    /// Returns the failed response if this is a response error (penetrates Context layers).
    #[must_use]
    pub fn as_response(&self) -> Option<&ResponseError> {
        match self.root_cause() {
            Error::Response(response) => Some(response.as_ref()),
            _ => None,
        }
    }

    /// Returns the transport error if this is a network error (penetrates Context layers).
    #[must_use]
    pub fn as_network(&self) -> Option<&NetworkError> {
        match self.root_cause() {
            Error::Network(network) => Some(network.as_ref()),
            _ => None,
        }
    }

    /// HTTP status of the failed response, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.as_response().map(ResponseError::status)
    }
}
