use crate::error::{Error, Result};
use reqwest::Client;
use std::sync::RwLock;
use tracing::debug;

use super::config::HttpConfig;
use super::endpoint::Endpoint;

/// `reqwest`-backed [`Transport`](super::Transport) bound to one endpoint origin.
#[derive(Debug)]
pub struct HttpClient {
    client: RwLock<Option<Client>>,
    endpoint: Endpoint,
    config: HttpConfig,
}

impl HttpClient {
    /// Creates a new HTTP client for `endpoint` with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration fails validation
    /// - The proxy URL is invalid
    /// - The HTTP client cannot be built
    pub fn new(endpoint: &Endpoint, config: HttpConfig) -> Result<Self> {
        let validation = config.validate()?;
        for warning in &validation.warnings {
            tracing::warn!(endpoint = %endpoint, "{warning}");
        }

        let mut builder = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            .gzip(config.gzip)
            .deflate(config.gzip)
            .brotli(config.gzip)
            .user_agent(&config.user_agent);

        if let Some(proxy_config) = &config.proxy {
            let mut proxy = reqwest::Proxy::all(&proxy_config.url)
                .map_err(|e| Error::invalid_endpoint(format!("Invalid proxy URL: {e}")))?;

            if let (Some(username), Some(password)) =
                (&proxy_config.username, &proxy_config.password)
            {
                proxy = proxy.basic_auth(username, password);
            }
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::network(format!("Failed to build HTTP client: {e}")))?;

        debug!(endpoint = %endpoint, "HTTP client opened");

        Ok(Self {
            client: RwLock::new(Some(client)),
            endpoint: endpoint.clone(),
            config,
        })
    }

    /// Returns a reference to the current HTTP configuration.
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// The endpoint this client talks to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns `true` once [`close`](super::Transport::close) has been called.
    pub fn is_closed(&self) -> bool {
        match self.client.read() {
            Ok(client) => client.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }

    /// Internal: a handle to the underlying reqwest client.
    pub(crate) fn client(&self) -> Result<Client> {
        let client = match self.client.read() {
            Ok(client) => client.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        client.ok_or_else(Error::closed)
    }

    /// Internal: drops the reqwest client, releasing pooled connections.
    pub(crate) fn shutdown(&self) {
        let previous = match self.client.write() {
            Ok(mut client) => client.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if previous.is_some() {
            debug!(endpoint = %self.endpoint, "HTTP client closed");
        }
    }
}
