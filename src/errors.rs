use std::time::Duration;

use thiserror::Error;

/// Main error type for the svnstatus crate
#[derive(Error, Debug)]
pub enum SvnStatusError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Subversion error: {0}")]
    Svn(#[from] SvnError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error while accessing config: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid branch pattern: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Could not load configuration: {0}")]
    LoadError(#[from] ::config::ConfigError),

    #[error("Could not serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Configuration file already exists - use 'svnstatus init --force' to overwrite it")]
    ConfigAlreadyExists,

    #[error("Could not determine home directory - please set HOME environment variable")]
    HomeDirNotFound,

    #[error("Invalid timeout: timeout_ms must be at least 1")]
    InvalidTimeout,

    #[error("Invalid branch format {format:?}: expected exactly one '%s' placeholder, found {found}")]
    InvalidBranchFormat { format: String, found: usize },
}

/// Errors raised while running the `svn` command line tool
#[derive(Error, Debug)]
pub enum SvnError {
    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} timed out after {}ms", .timeout.as_millis())]
    TimedOut { command: String, timeout: Duration },

    #[error("{command} was cancelled")]
    Cancelled { command: String },

    #[error("IO error while waiting for {command}: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Type alias for Result using `SvnStatusError`
pub type Result<T> = std::result::Result<T, SvnStatusError>;
