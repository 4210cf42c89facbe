use crate::config::{ProxyConfig, env_parse, env_var};
use crate::error::{ConfigValidationError, ValidationResult};
use std::time::Duration;

/// Transport configuration for [`HttpClient`](super::HttpClient).
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Total time allowed for sending a request and receiving response headers.
    pub timeout: Duration,
    /// TCP connection timeout (default: 10 seconds)
    pub connect_timeout: Duration,
    /// Default User-Agent header value
    pub user_agent: String,
    /// Optional proxy configuration
    pub proxy: Option<ProxyConfig>,
    /// Maximum number of idle keep-alive connections per host.
    ///
    /// Default: 10
    pub pool_max_idle_per_host: usize,
    /// Idle connections older than this are closed.
    ///
    /// Default: 90 seconds
    pub pool_idle_timeout: Duration,
    /// Maximum response body size in bytes (default: 10MB)
    ///
    /// Bodies exceeding this limit fail to read with
    /// [`NetworkError::ResponseTooLarge`](crate::error::NetworkError::ResponseTooLarge).
    pub max_response_size: usize,
    /// Maximum request body size in bytes (default: 10MB)
    ///
    /// Larger bodies are rejected before anything is sent.
    pub max_request_size: usize,
    /// Advertise and transparently decode gzip, deflate and brotli bodies.
    pub gzip: bool,
    /// Log request bodies at debug level.
    pub verbose: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("restkit/", env!("CARGO_PKG_VERSION")).to_string(),
            proxy: None,
            pool_max_idle_per_host: 10,
            pool_idle_timeout: Duration::from_secs(90),
            max_response_size: 10 * 1024 * 1024,
            max_request_size: 10 * 1024 * 1024,
            gzip: true,
            verbose: false,
        }
    }
}

impl HttpConfig {
    /// Builds a configuration from the defaults overridden by `RESTKIT_*`
    /// environment variables.
    ///
    /// | Variable                      | Field               |
    /// |-------------------------------|---------------------|
    /// | `RESTKIT_TIMEOUT_MS`          | `timeout`           |
    /// | `RESTKIT_CONNECT_TIMEOUT_MS`  | `connect_timeout`   |
    /// | `RESTKIT_USER_AGENT`          | `user_agent`        |
    /// | `RESTKIT_PROXY`               | `proxy`             |
    /// | `RESTKIT_MAX_RESPONSE_SIZE`   | `max_response_size` |
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = env_parse::<u64>("TIMEOUT_MS") {
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = env_parse::<u64>("CONNECT_TIMEOUT_MS") {
            config.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(user_agent) = env_var("USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(proxy) = env_var("PROXY") {
            config.proxy = Some(ProxyConfig::new(proxy));
        }
        if let Some(size) = env_parse::<usize>("MAX_RESPONSE_SIZE") {
            config.max_response_size = size;
        }

        config
    }

    /// Validates the configuration.
    ///
    /// # Validation Rules
    ///
    /// - `timeout` > 5 minutes returns an error
    /// - `timeout` < 1 second generates a warning
    /// - `max_request_size` and `max_response_size` must be non-zero
    ///
    /// # Example
    ///
    /// ```rust
    /// use restkit_core::transport::HttpConfig;
    /// use std::time::Duration;
    ///
    /// assert!(HttpConfig::default().validate().is_ok());
    ///
    /// let invalid = HttpConfig {
    ///     timeout: Duration::from_secs(600),
    ///     ..Default::default()
    /// };
    /// assert!(invalid.validate().is_err());
    /// ```
    pub fn validate(&self) -> std::result::Result<ValidationResult, ConfigValidationError> {
        let mut warnings = Vec::new();

        let max_timeout = Duration::from_secs(300);
        if self.timeout > max_timeout {
            return Err(ConfigValidationError::too_high(
                "timeout",
                format!("{:?}", self.timeout),
                "5 minutes",
            ));
        }

        if self.timeout < Duration::from_secs(1) {
            warnings.push(format!(
                "timeout {:?} is very short, may cause frequent timeouts",
                self.timeout
            ));
        }

        if self.max_request_size == 0 {
            return Err(ConfigValidationError::invalid(
                "max_request_size",
                "max_request_size cannot be zero",
            ));
        }

        if self.max_response_size == 0 {
            return Err(ConfigValidationError::invalid(
                "max_response_size",
                "max_response_size cannot be zero",
            ));
        }

        Ok(ValidationResult::with_warnings(warnings))
    }
}
