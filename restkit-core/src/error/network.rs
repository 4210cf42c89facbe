//! Network-related error types.

use std::error::Error as StdError;
use thiserror::Error;

/// Transport failures, passed through from the underlying HTTP client.
///
/// Wraps `reqwest` errors without exposing the third-party type in the
/// public API. None of these are retried by this crate; retry policy
/// belongs to the transport or the caller.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NetworkError {
    /// Request timed out.
    #[error("Request timeout")]
    Timeout,

    /// Connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The transport was closed before the request was submitted.
    #[error("Transport closed")]
    Closed,

    /// The response body exceeded the configured size limit.
    #[error("Response size {size} bytes exceeds limit {limit} bytes")]
    ResponseTooLarge {
        /// Bytes received (or announced) so far
        size: u64,
        /// Configured limit
        limit: usize,
    },

    /// Opaque transport error for underlying issues.
    #[error("Transport error")]
    Transport(#[source] Box<dyn StdError + Send + Sync + 'static>),
}
