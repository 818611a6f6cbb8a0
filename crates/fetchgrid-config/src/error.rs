//! Error types for endpoint configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Fatal configuration errors. Any of these stops the process before
/// the first polling cycle.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to open config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse config: {0}")]
    Parse(String),

    #[error("entry {index}: required name not found")]
    MissingName { index: usize },

    #[error("entry {index} ({name}): required url not found")]
    MissingUrl { index: usize, name: String },

    #[error("endpoint {name}: can't parse url {url}: {reason}")]
    InvalidUrl {
        name: String,
        url: String,
        reason: String,
    },
}
