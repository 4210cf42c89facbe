//! Shared configuration types.

use std::env;
use std::str::FromStr;

/// Proxy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy URL (e.g., "http://127.0.0.1:8080").
    pub url: String,
    /// Optional username for authentication.
    pub username: Option<String>,
    /// Optional password for authentication.
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Create a new proxy configuration with just a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
        }
    }

    /// Set credentials for the proxy.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

/// Reads `RESTKIT_<name>` from the environment.
pub(crate) fn env_var(name: &str) -> Option<String> {
    env::var(format!("RESTKIT_{name}"))
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// Reads and parses `RESTKIT_<name>`, ignoring values that do not parse.
pub(crate) fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env_var(name).and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_config_with_credentials() {
        let proxy = ProxyConfig::new("http://127.0.0.1:8080").with_credentials("user", "secret");
        assert_eq!(proxy.url, "http://127.0.0.1:8080");
        assert_eq!(proxy.username.as_deref(), Some("user"));
        assert_eq!(proxy.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_env_parse_missing_variable() {
        assert_eq!(env_parse::<u64>("SURELY_NOT_SET_ANYWHERE"), None);
    }
}
