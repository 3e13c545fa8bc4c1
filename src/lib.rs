//! MongoDB Script Batch Runner
//!
//! This library provides the core functionality for mongobatch, a
//! build-time tool that applies ordered sets of administrative scripts to
//! a MongoDB database. It can be used standalone to embed deterministic
//! script replay in other tooling.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration, connection settings, credential store
//! - `connection`: Client construction and authentication
//! - `endpoint`: Replica-set seed parsing
//! - `error`: Error types and handling
//! - `executor`: Server-side script evaluation
//! - `runner`: Directory enumeration and batch orchestration
//! - `script`: Script file decoding (gzip, charset)
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use mongobatch::{config::Config, runner::BatchRunner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_toml(
//!         "[connection]\nhostname = \"localhost\"\ndatabase = \"app\"",
//!     )?;
//!
//!     let runner = BatchRunner::new(config);
//!     let outcomes = runner.run(&[PathBuf::from("db/migrations")]).await?;
//!     println!("{} script(s) executed", outcomes.len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod connection;
pub mod endpoint;
pub mod error;
pub mod executor;
pub mod runner;
pub mod script;

// Re-export commonly used types
pub use config::{Config, ConnectionSettings, CredentialStore, Credentials};
pub use connection::ConnectionManager;
pub use endpoint::{Endpoint, parse_replica_set};
pub use error::{BatchError, Result};
pub use executor::{ExecutionOutcome, ScriptExecutor};
pub use runner::BatchRunner;
pub use script::{ScriptFile, ScriptReader};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
