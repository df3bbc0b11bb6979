//! Server configuration loaded from environment variables.

use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

/// Raw configuration as read from the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Listener ===
    /// Address to listen on, `host:port` or `:port`.
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Regex the `Origin` header must fully match for CORS.
    #[serde(default)]
    pub cors_origin: Option<String>,

    /// Maximum seconds a request may take before it is aborted.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    /// Maximum concurrent in-flight HTTP requests, not TCP connections (0 = unlimited).
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    // === Routing ===
    /// URL under which the server is externally reachable.
    #[serde(default)]
    pub external_url: Option<String>,

    /// Prefix for all routes. Defaults to the path of `external_url`.
    #[serde(default)]
    pub route_prefix: Option<String>,

    /// Page title.
    #[serde(default = "default_page_title")]
    pub page_title: String,

    // === Runtime ===
    /// Tokio worker threads. Defaults to the number of CPUs.
    #[serde(default)]
    pub worker_threads: Option<usize>,

    /// Report tuning knobs as empty strings.
    #[serde(default)]
    pub redact_tuning_knobs: bool,

    /// Log filter (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_listen_address() -> String {
    ":8080".to_string()
}

fn default_read_timeout() -> u64 {
    300
}

fn default_max_connections() -> usize {
    512
}

fn default_page_title() -> String {
    "ng-status".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// Validate the raw values and resolve them into [`Options`].
    pub fn into_options(self) -> Result<Options, ConfigError> {
        parse_listen_address(&self.listen_address)?;

        let cors_origin = match self.cors_origin.as_deref() {
            Some(pattern) if !pattern.is_empty() => Some(compile_anchored(pattern)?),
            _ => None,
        };

        let external_url = match self.external_url.as_deref() {
            Some(raw) if !raw.is_empty() => Some(Url::parse(raw)?),
            _ => None,
        };

        if self.worker_threads == Some(0) {
            return Err(ConfigError::InvalidWorkerThreads);
        }

        let route_prefix = match (&self.route_prefix, &external_url) {
            (Some(prefix), _) => normalize_prefix(prefix),
            (None, Some(url)) => normalize_prefix(url.path()),
            (None, None) => String::new(),
        };
        validate_prefix(&route_prefix)?;

        Ok(Options {
            listen_address: self.listen_address,
            cors_origin,
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            max_connections: self.max_connections,
            external_url,
            route_prefix,
            page_title: self.page_title,
            worker_threads: self.worker_threads,
            redact_tuning_knobs: self.redact_tuning_knobs,
        })
    }
}

/// Validated options for the web handler. Immutable after construction.
#[derive(Debug, Clone)]
pub struct Options {
    /// Address to listen on, as configured.
    pub listen_address: String,
    /// Anchored CORS origin pattern.
    pub cors_origin: Option<Regex>,
    /// Per-request timeout.
    pub read_timeout: Duration,
    /// Maximum concurrent in-flight HTTP requests, not TCP connections (0 = unlimited).
    pub max_connections: usize,
    /// URL under which the server is externally reachable.
    pub external_url: Option<Url>,
    /// Normalized route prefix: empty, or starts with `/` without a trailing one.
    pub route_prefix: String,
    /// Page title.
    pub page_title: String,
    /// Tokio worker threads.
    pub worker_threads: Option<usize>,
    /// Report tuning knobs as empty strings.
    pub redact_tuning_knobs: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            cors_origin: None,
            read_timeout: Duration::from_secs(default_read_timeout()),
            max_connections: default_max_connections(),
            external_url: None,
            route_prefix: String::new(),
            page_title: default_page_title(),
            worker_threads: None,
            redact_tuning_knobs: false,
        }
    }
}

impl Options {
    /// Address suitable for binding; a missing host means all interfaces.
    pub fn bind_address(&self) -> String {
        if self.listen_address.starts_with(':') {
            format!("0.0.0.0{}", self.listen_address)
        } else {
            self.listen_address.clone()
        }
    }
}

/// Check that `address` is `host:port` or `:port` with a valid port.
pub fn parse_listen_address(address: &str) -> Result<(&str, u16), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidListenAddress {
        address: address.to_string(),
        reason: reason.to_string(),
    };

    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| invalid("missing port"))?;
    let port = port.parse::<u16>().map_err(|_| invalid("bad port"))?;
    Ok((host, port))
}

fn compile_anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})$"))
}

/// Ensure the prefix starts with `/` and does not end with one.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Reject prefixes the router would treat as wildcards or path parameters.
fn validate_prefix(prefix: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidRoutePrefix {
        prefix: prefix.to_string(),
        reason: reason.to_string(),
    };

    if prefix.contains('*') {
        return Err(invalid("wildcards are not allowed"));
    }
    if prefix
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('{'))
    {
        return Err(invalid("path parameters are not allowed"));
    }
    Ok(())
}
