//! Configuration for llamaup
//!
//! [`InstallerConfig`] is built once per run from environment variables and
//! CLI flags (flags win), then passed by reference to every stage.
//!
//! # Environment Variables
//!
//! - `LLAMAUP_INSTALL_DIR`: where executables go - default: `~/.local/bin`
//! - `LLAMAUP_RELEASES_URL`: releases API base - default: llama.cpp on GitHub
//! - `LLAMAUP_HTTP_TIMEOUT`: request timeout in seconds - default: none
//! - `LLAMAUP_UPDATE_CONFIG`: update check settings file - default:
//!   `<config dir>/llamaup/update.conf`
//! - `LLAMAUP_LOG_LEVEL`: logging level - default: "info"
//! - `LLAMAUP_LOG_JSON`: JSON log output (true|false) - default: "false"
//! - `GITHUB_TOKEN`: optional token to lift API rate limits
//!
//! # Example
//!
//! ```no_run
//! use llamaup::InstallerConfig;
//!
//! let config = InstallerConfig::from_env().expect("home directory");
//! config.validate().expect("Invalid configuration");
//! println!("Installing into {}", config.install_dir.display());
//! ```

use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_RELEASES_URL: &str = "https://api.github.com/repos/ggml-org/llama.cpp/releases";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine a default install directory; pass --dir or set LLAMAUP_INSTALL_DIR")]
    NoInstallDir,

    #[error("Could not determine a config directory; set LLAMAUP_UPDATE_CONFIG")]
    NoConfigDir,

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

/// Settings for a single installer run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerConfig {
    /// Directory the executables are installed into
    pub install_dir: PathBuf,

    /// Release tag to install; latest when `None`
    pub version: Option<String>,

    /// Report what would happen without downloading
    pub dry_run: bool,

    /// Reinstall even when the installed build is current
    pub force: bool,

    /// Releases API base URL
    pub releases_url: String,

    pub github_token: Option<String>,

    /// `None` leaves the HTTP client without a timeout
    pub http_timeout_secs: Option<u64>,

    /// Location of the update check settings
    pub update_config_path: PathBuf,
}

impl InstallerConfig {
    /// Defaults for everything except the two paths
    pub fn new(install_dir: PathBuf, update_config_path: PathBuf) -> Self {
        Self {
            install_dir,
            version: None,
            dry_run: false,
            force: false,
            releases_url: DEFAULT_RELEASES_URL.to_string(),
            github_token: None,
            http_timeout_secs: None,
            update_config_path,
        }
    }

    /// Loads configuration from `LLAMAUP_*` environment variables with defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let install_dir = match env::var("LLAMAUP_INSTALL_DIR") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => default_install_dir()?,
        };

        let mut config = Self::new(install_dir, update_config_path()?);

        if let Ok(url) = env::var("LLAMAUP_RELEASES_URL") {
            config.releases_url = url;
        }

        config.http_timeout_secs = match env::var("LLAMAUP_HTTP_TIMEOUT") {
            Ok(value) => Some(value.parse::<u64>().map_err(|e| ConfigError::ParseError {
                field: "LLAMAUP_HTTP_TIMEOUT".to_string(),
                error: e.to_string(),
            })?),
            Err(_) => None,
        };

        config.github_token = env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());

        Ok(config)
    }

    /// Validates the configuration
    ///
    /// Checks that:
    /// - The releases URL is not empty
    /// - A configured timeout is non-zero
    /// - The install directory, if it exists, is a directory
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.releases_url.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "releases URL must not be empty".to_string(),
            ));
        }

        if self.http_timeout_secs == Some(0) {
            return Err(ConfigError::ValidationFailed(
                "HTTP timeout must be greater than 0".to_string(),
            ));
        }

        if self.install_dir.exists() && !self.install_dir.is_dir() {
            return Err(ConfigError::ValidationFailed(format!(
                "install path {} is not a directory",
                self.install_dir.display()
            )));
        }

        if let Some(version) = &self.version {
            if version.trim().is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "version tag must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// `LLAMAUP_UPDATE_CONFIG`, else `<config dir>/llamaup/update.conf`
pub fn update_config_path() -> Result<PathBuf, ConfigError> {
    match env::var("LLAMAUP_UPDATE_CONFIG") {
        Ok(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => dirs::config_dir()
            .map(|dir| dir.join("llamaup").join("update.conf"))
            .ok_or(ConfigError::NoConfigDir),
    }
}

pub fn default_install_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".local").join("bin"))
        .ok_or(ConfigError::NoInstallDir)
}
