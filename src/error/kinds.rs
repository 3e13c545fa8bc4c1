use std::{fmt, io};

use crate::error::mongo::format_mongodb_error;

/// Crate-wide `Result` type using [`BatchError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, BatchError>;

/// Top-level error type for batch operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum BatchError {
    /// Configuration errors. Always fatal, raised before any network
    /// or file I/O takes place.
    Config(ConfigError),

    /// Connection-related errors. Fatal for the whole batch.
    Connection(ConnectionError),

    /// Script read/decode errors, raised out of the per-file read path.
    Script(ScriptError),

    /// I/O errors.
    Io(io::Error),

    /// MongoDB driver errors.
    MongoDb(mongodb::error::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config file format.
    InvalidFormat(String),

    /// Missing required field or parameter.
    MissingField(String),

    /// Neither a hostname nor a replica set is configured.
    NoAddress { settings: String },

    /// A named credential reference did not resolve in the store.
    CredentialNotFound { reference: String, settings: String },

    /// A resolved credential entry has an empty username.
    EmptyUsername { reference: String, settings: String },

    /// A replica-set seed token has an empty or whitespace-only host.
    EmptySeedHost { token: String },

    /// A replica-set seed token carries a non-numeric or out-of-range port.
    InvalidSeedPort { token: String },

    /// The configured script encoding is not a known charset label.
    UnknownEncoding(String),
}

/// Connection-specific errors.
#[derive(Debug)]
pub enum ConnectionError {
    /// Failed to establish a connection (unknown host, server selection).
    ConnectionFailed(String),

    /// The post-open ping command failed.
    PingFailed(String),
}

/// Script read errors.
#[derive(Debug)]
pub enum ScriptError {
    /// The path does not exist or is not a regular readable file.
    NotAFile(String),

    /// Reading or decompressing the script content failed.
    Read { name: String, message: String },
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::Config(e) => write!(f, "Configuration error: {e}"),
            BatchError::Connection(e) => write!(f, "Connection error: {e}"),
            BatchError::Script(e) => write!(f, "Script error: {e}"),
            BatchError::Io(e) => write!(f, "I/O error: {e}"),
            BatchError::MongoDb(e) => format_mongodb_error(f, e),
            BatchError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::MissingField(field) => write!(f, "Missing required field: {field}"),
            ConfigError::NoAddress { settings } => {
                write!(f, "[{settings}] hostname or replica_set must be defined")
            }
            ConfigError::CredentialNotFound {
                reference,
                settings,
            } => {
                write!(
                    f,
                    "[{settings}] credential reference '{reference}' not found"
                )
            }
            ConfigError::EmptyUsername {
                reference,
                settings,
            } => {
                write!(
                    f,
                    "[{settings}] credential reference '{reference}' found, but username is empty"
                )
            }
            ConfigError::EmptySeedHost { token } => {
                write!(f, "Replica-set seed '{token}' has an empty host")
            }
            ConfigError::InvalidSeedPort { token } => {
                write!(f, "Replica-set seed '{token}' has an invalid port")
            }
            ConfigError::UnknownEncoding(label) => {
                write!(f, "Unknown script encoding: {label}")
            }
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::ConnectionFailed(msg) => write!(f, "Failed to connect: {msg}"),
            ConnectionError::PingFailed(msg) => write!(f, "Ping failed: {msg}"),
        }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::NotAFile(name) => write!(f, "{name} is not a file"),
            ScriptError::Read { name, message } => {
                write!(f, "Failed to read {name}: {message}")
            }
        }
    }
}

impl std::error::Error for BatchError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for ConnectionError {}
impl std::error::Error for ScriptError {}

/* ========================= Conversions to BatchError ========================= */

impl From<io::Error> for BatchError {
    fn from(err: io::Error) -> Self {
        BatchError::Io(err)
    }
}

impl From<mongodb::error::Error> for BatchError {
    fn from(err: mongodb::error::Error) -> Self {
        BatchError::MongoDb(err)
    }
}

impl From<ConfigError> for BatchError {
    fn from(err: ConfigError) -> Self {
        BatchError::Config(err)
    }
}

impl From<ConnectionError> for BatchError {
    fn from(err: ConnectionError) -> Self {
        BatchError::Connection(err)
    }
}

impl From<ScriptError> for BatchError {
    fn from(err: ScriptError) -> Self {
        BatchError::Script(err)
    }
}

impl From<String> for BatchError {
    fn from(msg: String) -> Self {
        BatchError::Generic(msg)
    }
}

impl From<&str> for BatchError {
    fn from(msg: &str) -> Self {
        BatchError::Generic(msg.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display_includes_settings_label() {
        let err = ConfigError::NoAddress {
            settings: "db_connection_settings".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("db_connection_settings"));
        assert!(msg.contains("hostname or replica_set"));
    }

    #[test]
    fn test_credential_errors_name_the_reference() {
        let not_found = ConfigError::CredentialNotFound {
            reference: "prod".to_string(),
            settings: "db_connection_settings".to_string(),
        };
        assert!(not_found.to_string().contains("'prod'"));

        let empty = ConfigError::EmptyUsername {
            reference: "prod".to_string(),
            settings: "db_connection_settings".to_string(),
        };
        assert!(empty.to_string().contains("username is empty"));
    }

    #[test]
    fn test_script_error_names_the_file() {
        let err = ScriptError::NotAFile("001_init.js".to_string());
        assert_eq!(err.to_string(), "001_init.js is not a file");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err: BatchError = io_err.into();
        assert!(matches!(err, BatchError::Io(_)));
    }
}
