//! Directory batch orchestration
//!
//! This module drives a whole batch run: validate settings, open one
//! connection, then walk each directory executing every regular file in
//! deterministic filename order.
//!
//! Ordering is the load-bearing invariant here: files execute in plain
//! lexicographic (code-point) order of their names, so callers can rely
//! on `001_init.js`, `002_seed.js`, ... replaying identically everywhere.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{Config, check_settings, resolve_credentials};
use crate::connection::ConnectionManager;
use crate::error::{BatchError, ConfigError, Result};
use crate::executor::{ExecutionOutcome, ScriptExecutor};
use crate::script::{ScriptFile, ScriptReader};

/// Settings label used in pre-flight validation errors.
const SETTINGS_LABEL: &str = "db_connection_settings";

/// Runs directories of scripts against one open connection.
pub struct BatchRunner {
    config: Config,
}

impl BatchRunner {
    /// Create a runner over the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Validate settings, resolve credentials, and open the connection.
    ///
    /// The connection is opened once per batch invocation and reused for
    /// every script in every directory.
    pub async fn connect(&self) -> Result<ConnectionManager> {
        check_settings(&self.config.connection, &self.config, SETTINGS_LABEL)?;
        let credentials = resolve_credentials(&self.config.connection, &self.config)?;
        let mut manager = ConnectionManager::new(self.config.connection.clone(), credentials);
        manager.connect().await?;
        Ok(manager)
    }

    /// Execute every script in the given directories, in caller order.
    ///
    /// An empty directory list is a configuration error raised before any
    /// connection is opened. Directory-level problems (missing path, not a
    /// directory) and script read/decode failures abort the run; script
    /// execution failures become outcomes and the run continues.
    ///
    /// # Returns
    /// * `Result<Vec<ExecutionOutcome>>` - One outcome per executed script
    pub async fn run(&self, directories: &[PathBuf]) -> Result<Vec<ExecutionOutcome>> {
        if directories.is_empty() {
            return Err(ConfigError::MissingField("directories".to_string()).into());
        }

        // Encoding validation is a configuration error; surface it before
        // touching the network, like the settings check.
        let reader = ScriptReader::new(self.config.batch.script_encoding.as_deref())?;

        let manager = self.connect().await?;
        let executor = ScriptExecutor::new(manager.database()?);

        let mut outcomes = Vec::new();
        for directory in directories {
            outcomes.extend(run_directory(&executor, &reader, directory).await?);
        }

        let (succeeded, failed) = summarize(&outcomes);
        if failed > 0 {
            warn!(succeeded, failed, "batch finished with script failures");
        } else {
            info!(succeeded, "batch finished");
        }

        Ok(outcomes)
    }

    /// Drop the configured database. Tooling path, not part of batch runs.
    pub async fn drop_database(&self) -> Result<()> {
        let manager = self.connect().await?;
        manager.drop_database().await
    }
}

/// Execute all scripts in one directory, in lexicographic filename order.
async fn run_directory(
    executor: &ScriptExecutor,
    reader: &ScriptReader,
    directory: &Path,
) -> Result<Vec<ExecutionOutcome>> {
    let label = directory_label(directory);
    info!(directory = %label, "executing scripts in directory");

    let scripts = collect_scripts(directory)?;
    let mut outcomes = Vec::with_capacity(scripts.len());

    for script in scripts {
        // Read errors propagate and abort the directory; execution
        // failures are contained in the outcome.
        let source = reader.read(&script)?;
        let outcome = executor.execute(&script, &source).await;
        info!(
            script = %outcome.script_name,
            elapsed_seconds = outcome.elapsed_seconds,
            "script completed execution"
        );
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

/// Enumerate the regular files of a directory as scripts, sorted by
/// filename with plain code-point comparison.
///
/// Subdirectories and non-regular entries are skipped silently. A path
/// that is not an existing directory is a fatal error.
pub fn collect_scripts(directory: &Path) -> Result<Vec<ScriptFile>> {
    if !directory.is_dir() {
        return Err(BatchError::Generic(format!(
            "{} is not a directory",
            directory_label(directory)
        )));
    }

    let mut scripts = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            scripts.push(ScriptFile::new(path));
        }
    }

    scripts.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(scripts)
}

/// Count successful and failed outcomes.
pub fn summarize(outcomes: &[ExecutionOutcome]) -> (usize, usize) {
    let succeeded = outcomes.iter().filter(|o| o.succeeded).count();
    (succeeded, outcomes.len() - succeeded)
}

fn directory_label(directory: &Path) -> String {
    directory
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| directory.display().to_string())
}
