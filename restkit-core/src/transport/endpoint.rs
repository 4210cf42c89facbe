use crate::error::{Error, Result};
use crate::reference::Reference;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// An absolute `http`/`https` URL naming where a service lives.
///
/// The origin (scheme, host, port) selects the server; the path and query
/// become the base [`Reference`] of resources connected to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
}

impl Endpoint {
    /// Parses an endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] for unparseable URLs, non-HTTP
    /// schemes and URLs without a host.
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input)?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_endpoint(format!(
                "unsupported scheme '{}' in {input}",
                url.scheme()
            )));
        }
        if url.host_str().is_none() {
            return Err(Error::invalid_endpoint(format!("missing host in {input}")));
        }

        Ok(Self { url })
    }

    /// The full endpoint URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Path and query of the endpoint as a reference.
    pub fn reference(&self) -> Reference {
        match self.url.query() {
            Some(query) => Reference::parse(&format!("{}?{query}", self.url.path())),
            None => Reference::parse(self.url.path()),
        }
    }

    /// Absolute URL for `reference` on this endpoint's origin. Fragments are
    /// never sent to the server.
    pub fn resolve(&self, reference: &Reference) -> Url {
        let mut url = self.url.clone();
        url.set_path(reference.path());
        url.set_query(reference.query().as_deref());
        url.set_fragment(None);
        url
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Endpoint {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.url.fmt(f)
    }
}
