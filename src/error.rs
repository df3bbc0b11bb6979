//! Unified error types for the status server.

use thiserror::Error;

/// Top-level error type for running the server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration loading or validation error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Failed to bind the listen address.
    #[error("failed to bind {address}: {source}")]
    Bind {
        /// The address that could not be bound.
        address: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// IO error while serving.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variables could not be deserialized.
    #[error("failed to load environment: {0}")]
    Env(#[from] envy::Error),

    /// Listen address is not `host:port` or `:port`.
    #[error("invalid listen address {address:?}: {reason}")]
    InvalidListenAddress {
        /// The rejected address.
        address: String,
        /// Reason for rejection.
        reason: String,
    },

    /// CORS origin regex failed to compile.
    #[error("invalid CORS origin pattern: {0}")]
    InvalidCorsOrigin(#[from] regex::Error),

    /// External URL failed to parse.
    #[error("invalid external URL: {0}")]
    InvalidExternalUrl(#[from] url::ParseError),

    /// Route prefix cannot be mounted as a literal path.
    #[error("invalid route prefix {prefix:?}: {reason}")]
    InvalidRoutePrefix {
        /// The rejected prefix.
        prefix: String,
        /// Reason for rejection.
        reason: String,
    },

    /// Worker thread count must be at least one.
    #[error("WORKER_THREADS must be at least 1")]
    InvalidWorkerThreads,
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ServerError>;
