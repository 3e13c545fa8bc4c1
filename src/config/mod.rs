//! Configuration management for mongobatch
//!
//! This module handles loading, parsing, and validating configuration:
//! - Configuration files (TOML format)
//! - Connection settings (single host or replica set, credentials)
//! - Named credential store entries
//! - Batch options (script encoding, default script directories)
//!
//! Command-line arguments override file values; the merge happens in the
//! `cli` module.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Connection settings for the target database
    #[serde(default)]
    pub connection: ConnectionSettings,

    /// Named credential entries, addressable via `credential_ref`
    #[serde(default)]
    pub credentials: HashMap<String, Credentials>,

    /// Batch execution options
    #[serde(default)]
    pub batch: BatchConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection settings for the target database.
///
/// Exactly one addressing mode must be configured: either `hostname`
/// (plus optional `port`), or a non-empty `replica_set` seed list. Both
/// empty is a configuration error, caught by [`check_settings`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Hostname for single-host mode
    pub hostname: Option<String>,

    /// Port for single-host mode (driver default when absent)
    pub port: Option<u16>,

    /// Comma-separated replica-set seed list, e.g. `"db1:27017,db2"`
    pub replica_set: Option<String>,

    /// Target database name
    pub database: String,

    /// Inline username (ignored when `credential_ref` is set)
    pub username: Option<String>,

    /// Inline password (ignored when `credential_ref` is set)
    pub password: Option<String>,

    /// Named credential store entry to resolve instead of inline values
    pub credential_ref: Option<String>,

    /// Optional driver tunables
    pub options: Option<DriverOptions>,
}

impl ConnectionSettings {
    /// Settings addressing only a database name, everything else unset.
    pub fn for_database(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }
}

/// Optional driver tunables, applied onto `ClientOptions` when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriverOptions {
    /// Connection timeout in seconds
    pub connect_timeout_secs: Option<u64>,

    /// Server selection timeout in seconds
    pub server_selection_timeout_secs: Option<u64>,

    /// Maximum connection pool size
    pub max_pool_size: Option<u32>,

    /// Bypass topology discovery and connect to the host directly
    pub direct_connection: Option<bool>,

    /// Application name reported to the server
    pub app_name: Option<String>,
}

/// A username/password pair resolved from the credential store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Username; must be non-empty for a store entry to be valid
    pub username: String,

    /// Password; authentication is skipped when absent
    pub password: Option<String>,
}

/// Batch execution options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Character encoding for script files; platform/UTF-8 default when unset
    pub script_encoding: Option<String>,

    /// Default directories for the `migrate` subcommand
    #[serde(default)]
    pub migration_dirs: Vec<PathBuf>,

    /// Default directories for the `train` subcommand
    #[serde(default)]
    pub training_dirs: Vec<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// External credential lookup by name.
///
/// The core never knows how credentials are stored; anything that can map
/// a reference to a username/password pair can back a connection. The TOML
/// config file's `[credentials.<name>]` tables are the default store.
pub trait CredentialStore {
    /// Resolve a named credential entry, if present.
    fn resolve(&self, name: &str) -> Option<Credentials>;
}

impl CredentialStore for Config {
    fn resolve(&self, name: &str) -> Option<Credentials> {
        self.credentials.get(name).cloned()
    }
}

impl CredentialStore for HashMap<String, Credentials> {
    fn resolve(&self, name: &str) -> Option<Credentials> {
        self.get(name).cloned()
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file.
    ///
    /// An explicitly given path must exist; the default path may be absent,
    /// in which case defaults are used.
    ///
    /// # Arguments
    /// * `path` - Explicit config file path, or `None` for the default location
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(explicit) => {
                if !explicit.exists() {
                    return Err(
                        ConfigError::FileNotFound(explicit.display().to_string()).into()
                    );
                }
                Self::from_file(explicit)
            }
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::from_file(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Get the default configuration file path
    ///
    /// # Returns
    /// * `PathBuf` - Path to default configuration file
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".mongobatch")
            .join("config.toml")
    }
}

/// Pre-flight validation of connection settings.
///
/// This is the only validation that runs before any network activity:
/// either a named credential reference must resolve in the store with a
/// non-empty username, or one of `hostname`/`replica_set` must be set.
///
/// # Arguments
/// * `settings` - The settings to check
/// * `store` - Credential store for resolving `credential_ref`
/// * `label` - Settings name used in error messages
pub fn check_settings(
    settings: &ConnectionSettings,
    store: &dyn CredentialStore,
    label: &str,
) -> Result<()> {
    if let Some(reference) = non_empty(settings.credential_ref.as_deref()) {
        let creds = store.resolve(reference).ok_or_else(|| {
            ConfigError::CredentialNotFound {
                reference: reference.to_string(),
                settings: label.to_string(),
            }
        })?;
        if creds.username.trim().is_empty() {
            return Err(ConfigError::EmptyUsername {
                reference: reference.to_string(),
                settings: label.to_string(),
            }
            .into());
        }
    } else if non_empty(settings.hostname.as_deref()).is_none()
        && non_empty(settings.replica_set.as_deref()).is_none()
    {
        return Err(ConfigError::NoAddress {
            settings: label.to_string(),
        }
        .into());
    }

    Ok(())
}

/// Resolve the credentials a connection should authenticate with.
///
/// A set `credential_ref` takes precedence and is looked up in the store;
/// otherwise the inline username/password from the settings are used.
/// `None` means no username is configured at all.
pub fn resolve_credentials(
    settings: &ConnectionSettings,
    store: &dyn CredentialStore,
) -> Result<Option<Credentials>> {
    if let Some(reference) = non_empty(settings.credential_ref.as_deref()) {
        let creds = store.resolve(reference).ok_or_else(|| {
            ConfigError::CredentialNotFound {
                reference: reference.to_string(),
                settings: "connection".to_string(),
            }
        })?;
        return Ok(Some(creds));
    }

    match non_empty(settings.username.as_deref()) {
        Some(username) => Ok(Some(Credentials {
            username: username.to_string(),
            password: settings.password.clone(),
        })),
        None => Ok(None),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
