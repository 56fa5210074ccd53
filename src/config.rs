//! Configuration for winrm-courier
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - User configuration (`~/.config/winrm-courier/config.toml`)
//! - Project configuration (`./winrm-courier.toml`)
//! - Environment variables
//! - Command-line arguments (applied by the binary)
//!
//! The delivery engine never reads the environment itself. `WINRM_DEBUG` is
//! folded into [`Config::verbose_logging`] here and handed to the engine
//! through [`Config::delivery_config`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::delivery::{DeliveryConfig, Target, DEFAULT_ENDPOINT};

/// Default user, matching the stock Vagrant Windows boxes
pub const DEFAULT_USER: &str = "vagrant";

/// Default password, matching the stock Vagrant Windows boxes
pub const DEFAULT_PASSWORD: &str = "vagrant";

/// Project-level configuration file name
pub const PROJECT_CONFIG_FILE: &str = "winrm-courier.toml";

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        /// Path to the file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid TOML for this schema.
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        /// Path to the file
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// The configured endpoint is not a URL.
    #[error("Invalid endpoint URL '{endpoint}': {source}")]
    InvalidEndpoint {
        /// The rejected endpoint
        endpoint: String,
        /// Underlying parse error
        #[source]
        source: url::ParseError,
    },
}

/// Main configuration structure
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// WinRM listener URL
    pub endpoint: String,

    /// Basic-Authentication user
    pub user: String,

    /// Basic-Authentication password
    #[serde(skip_serializing)]
    pub password: String,

    /// Dump request, response and fault bodies
    pub verbose_logging: bool,

    /// Request timeout in seconds (unset for no timeout)
    pub timeout_secs: Option<u64>,

    /// Verify TLS certificates on https endpoints
    pub verify_tls: bool,

    /// Additional PEM root certificate
    pub ca_cert: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            verbose_logging: false,
            timeout_secs: None,
            verify_tls: true,
            ca_cert: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("verbose_logging", &self.verbose_logging)
            .field("timeout_secs", &self.timeout_secs)
            .field("verify_tls", &self.verify_tls)
            .field("ca_cert", &self.ca_cert)
            .finish()
    }
}

impl Config {
    /// Load configuration from files and the environment.
    ///
    /// An explicit path must exist. Otherwise every standard location that
    /// exists is merged, later locations taking priority.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        match config_path {
            Some(path) => config = config.merge(Self::from_file(path)?),
            None => {
                for path in Self::get_config_paths() {
                    if path.exists() {
                        debug!(path = %path.display(), "Loading config file");
                        config = config.merge(Self::from_file(&path)?);
                    }
                }
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Get the standard configuration locations, lowest priority first
    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("winrm-courier").join("config.toml"));
        }

        paths.push(PathBuf::from(PROJECT_CONFIG_FILE));

        if let Ok(env_config) = std::env::var("WINRM_COURIER_CONFIG") {
            paths.push(PathBuf::from(env_config));
        }

        paths
    }

    /// Parse a single TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Merge another configuration; its non-default values win
    pub fn merge(self, other: Config) -> Self {
        let defaults = Config::default();

        Self {
            endpoint: if other.endpoint != defaults.endpoint {
                other.endpoint
            } else {
                self.endpoint
            },
            user: if other.user != defaults.user {
                other.user
            } else {
                self.user
            },
            password: if other.password != defaults.password {
                other.password
            } else {
                self.password
            },
            verbose_logging: self.verbose_logging || other.verbose_logging,
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            verify_tls: self.verify_tls && other.verify_tls,
            ca_cert: other.ca_cert.or(self.ca_cert),
        }
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // WINRM_ENDPOINT
        if let Some(endpoint) = lookup("WINRM_ENDPOINT") {
            self.endpoint = endpoint;
        }

        // WINRM_USER
        if let Some(user) = lookup("WINRM_USER") {
            self.user = user;
        }

        // WINRM_PASSWORD
        if let Some(password) = lookup("WINRM_PASSWORD") {
            self.password = password;
        }

        // WINRM_TIMEOUT
        if let Some(timeout) = lookup("WINRM_TIMEOUT") {
            match timeout.parse() {
                Ok(secs) => self.timeout_secs = Some(secs),
                Err(_) => warn!(value = %timeout, "Ignoring invalid WINRM_TIMEOUT"),
            }
        }

        // WINRM_DEBUG: any non-empty value enables wire dumps
        if lookup("WINRM_DEBUG").is_some_and(|value| !value.is_empty()) {
            self.verbose_logging = true;
        }
    }

    /// Parse the configured endpoint
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.endpoint).map_err(|source| ConfigError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            source,
        })
    }

    /// Endpoint and credentials for the delivery engine
    pub fn target(&self) -> Result<Target, ConfigError> {
        Ok(Target::new(
            self.endpoint_url()?,
            self.user.clone(),
            self.password.clone(),
        ))
    }

    /// Construction options for the delivery engine
    pub fn delivery_config(&self) -> DeliveryConfig {
        let mut config = DeliveryConfig::new()
            .with_verbose_logging(self.verbose_logging)
            .with_verify_tls(self.verify_tls);

        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(ca_cert) = &self.ca_cert {
            config = config.with_ca_cert(ca_cert);
        }

        config
    }
}
