//! Configuration Management Module for svnstatus
//!
//! This module handles all configuration-related functionality, including
//! - Loading settings from the configuration file and the environment
//! - Writing a default configuration file
//! - Turning settings into segment options
//!
//! # Configuration Structure
//!
//! The configuration is stored in TOML format at `~/.config/svnstatus/config.toml`:
//!
//! ```toml
//! branch_format = " %s"
//! branch_re = "/(trunk)(?:/|$)|/(?:tags|branch(?:es)?)/([^/]+)"
//! line_start = "URL: "
//! timeout_ms = 5000
//! svn_binary = "svn"
//! status_ignore = ["  Tree conflicts"]
//! ```
//!
//! Every key is optional. Environment variables prefixed with `SVNSTATUS_`
//! (e.g. `SVNSTATUS_TIMEOUT_MS`) override the file; `SVNSTATUS_STATUS_IGNORE`
//! takes a comma separated list.

use std::{
    fs,
    path::PathBuf,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    errors::{ConfigError, Result},
    segment::DEFAULT_BRANCH_FORMAT,
    svn::{
        SegmentOptions, SvnCli,
        info::{DEFAULT_BRANCH_RE, DEFAULT_LINE_START},
        inspector::{DEFAULT_SVN_BINARY, DEFAULT_TIMEOUT},
    },
};

/// Prefix of environment variables overriding the configuration file.
pub const ENV_PREFIX: &str = "SVNSTATUS";

/// Settings of the segment provider and its `svn` runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub branch_format: Option<String>,
    pub branch_re: Option<String>,
    pub line_start: Option<String>,
    pub timeout_ms: u64,
    pub svn_binary: String,
    pub status_ignore: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            branch_format: None,
            branch_re: None,
            line_start: None,
            timeout_ms: u64::try_from(DEFAULT_TIMEOUT.as_millis()).unwrap_or(u64::MAX),
            svn_binary: DEFAULT_SVN_BINARY.to_string(),
            status_ignore: Vec::new(),
        }
    }
}

impl Settings {
    /// Settings with every default spelled out, as written by `svnstatus init`.
    #[must_use]
    pub fn documented() -> Self {
        Self {
            branch_format: Some(DEFAULT_BRANCH_FORMAT.to_string()),
            branch_re: Some(DEFAULT_BRANCH_RE.to_string()),
            line_start: Some(DEFAULT_LINE_START.to_string()),
            ..Self::default()
        }
    }

    /// Checks the values serde cannot reject on its own.
    ///
    /// # Errors
    /// * If `timeout_ms` is 0, which would time out every command
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout.into());
        }
        Ok(())
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub fn segment_options(&self) -> SegmentOptions {
        SegmentOptions {
            branch_format: self.branch_format.clone(),
            branch_re: self.branch_re.clone(),
            line_start: self.line_start.clone(),
            status_ignore: self.status_ignore.clone(),
        }
    }

    #[must_use]
    pub fn runner(&self) -> SvnCli {
        SvnCli::new(self.svn_binary.clone(), self.timeout())
    }
}

/// Main configuration struct that handles all config operations
pub struct Config {
    root: PathBuf,
}

impl Config {
    /// Creates a new Config instance rooted at the home directory
    ///
    /// # Errors
    /// * When the home directory cannot be determined
    pub fn new() -> Result<Self> {
        let root = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
        Ok(Config { root })
    }

    /// Creates a new Config instance with a custom root path
    ///
    /// # Arguments
    /// * `root` - The custom root path
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Config { root: root.into() }
    }

    /// Loads the settings from the configuration file, if any, then from
    /// `SVNSTATUS_*` environment variables.
    ///
    /// # Errors
    /// * If the configuration file cannot be parsed
    /// * If a setting has the wrong type
    pub fn load(&self) -> Result<Settings> {
        let config_file = self.get_config_file_path();
        debug!(path = %config_file.display(), exists = config_file.exists(), "loading config");

        let settings = ::config::Config::builder()
            .add_source(::config::File::from(config_file.as_path()).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("status_ignore"),
            )
            .build()
            .map_err(ConfigError::LoadError)?
            .try_deserialize::<Settings>()
            .map_err(ConfigError::LoadError)?;

        settings.validate()?;
        Ok(settings)
    }

    /// Writes a configuration file holding the documented defaults.
    ///
    /// # Arguments
    /// * `force` - Overwrite an existing file
    ///
    /// # Errors
    /// * If an I/O error occurs while creating the configuration file
    /// * If the file already exists and `force` is not set
    pub fn create_config_file(&self, force: bool) -> Result<PathBuf> {
        let config_folder = self.get_config_folder_path();

        if !config_folder.exists() {
            fs::create_dir_all(&config_folder).map_err(ConfigError::IoError)?;
        }

        let config_file = self.get_config_file_path();

        if config_file.exists() && !force {
            return Err(ConfigError::ConfigAlreadyExists.into());
        }

        let config_content =
            toml::to_string_pretty(&Settings::documented()).map_err(ConfigError::SerializeError)?;
        fs::write(&config_file, config_content).map_err(ConfigError::IoError)?;

        Ok(config_file)
    }

    /// Returns the path to the configuration folder.
    #[must_use]
    pub fn get_config_folder_path(&self) -> PathBuf {
        self.root.join(".config").join("svnstatus")
    }

    /// Returns the path to the configuration file
    #[must_use]
    pub fn get_config_file_path(&self) -> PathBuf {
        self.get_config_folder_path().join("config.toml")
    }
}
