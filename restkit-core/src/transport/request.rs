use crate::error::{Error, Result};
use crate::reference::Reference;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Method, header::HeaderMap};
use tracing::{debug, error, instrument, warn};

use super::Transport;
use super::builder::HttpClient;
use super::response::Response;

/// A fully formed outbound request, relative to the transport's endpoint.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Path, query and fragment to address.
    pub reference: Reference,
    /// Headers sent with the request.
    pub headers: HeaderMap,
    /// Encoded body, if any.
    pub body: Option<Bytes>,
}

impl Request {
    /// A request without body.
    pub fn new(method: Method, reference: Reference, headers: HeaderMap) -> Self {
        Self {
            method,
            reference,
            headers,
            body: None,
        }
    }

    /// Attaches an encoded body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

impl HttpClient {
    /// Sends `request` with timeout control.
    ///
    /// The whole exchange, up to and including the response headers, is
    /// wrapped with `tokio::time::timeout`. The body is left unread.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The client has been closed
    /// - The request body exceeds `max_request_size`
    /// - The response announces a body larger than `max_response_size`
    /// - The operation times out
    /// - Network communication fails
    #[instrument(
        name = "http_send",
        skip(self, request),
        fields(
            method = %request.method,
            reference = %request.reference,
            has_body = request.body.is_some(),
            status,
        )
    )]
    pub async fn send(&self, request: Request) -> Result<Response> {
        let client = self.client()?;
        let url = self.endpoint().resolve(&request.reference);
        let max_request_size = self.config().max_request_size;

        let mut builder = client
            .request(request.method, url.clone())
            .headers(request.headers);

        if let Some(body) = request.body {
            if body.len() > max_request_size {
                return Err(Error::invalid_request(format!(
                    "Request body {} bytes exceeds limit {} bytes",
                    body.len(),
                    max_request_size
                )));
            }

            if self.config().verbose {
                debug!(
                    body = %String::from_utf8_lossy(&body),
                    "HTTP request with body"
                );
            }
            builder = builder.body(body);
        } else if self.config().verbose {
            debug!("HTTP request without body");
        }

        let total_timeout = self.config().timeout;
        let response = match tokio::time::timeout(total_timeout, builder.send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!(error = %e, "HTTP request send failed");
                return Err(e.into());
            }
            Err(_elapsed) => {
                warn!(
                    url = %url,
                    timeout_ms = %total_timeout.as_millis(),
                    "HTTP request timed out"
                );
                return Err(Error::timeout(format!(
                    "Request to {url} timed out after {}ms",
                    total_timeout.as_millis()
                )));
            }
        };

        tracing::Span::current().record("status", response.status().as_u16());

        let response = Response::from_reqwest(response, self.config().max_response_size)?;
        debug!(status = %response.status(), "HTTP response received");
        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn call(&self, request: Request) -> Result<Response> {
        self.send(request).await
    }

    fn close(&self) {
        self.shutdown();
    }
}
