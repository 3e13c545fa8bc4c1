//! Server-side script execution
//!
//! This module submits decoded script text to the server as a single
//! anonymous-function eval and converts the result into a typed
//! [`ExecutionOutcome`]. Execution is strictly best-effort: a failing
//! script produces a failure outcome and never an `Err`, so one bad
//! script cannot halt a batch.

use std::time::Instant;

use bson::{Document, doc};
use mongodb::Database;
use tracing::{error, info, warn};

use crate::error::{extract_error_info, is_server_error};
use crate::script::ScriptFile;

/// Per-script execution result.
///
/// Ephemeral: produced per script, aggregated by the batch runner for
/// logging and the end-of-run summary. The batch itself has no overall
/// success/failure signal beyond "did not abort".
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    /// Name of the executed script file
    pub script_name: String,

    /// Whether the server reported success
    pub succeeded: bool,

    /// Server or transport error message when execution failed
    pub error_message: Option<String>,

    /// Wall-clock execution time in seconds
    pub elapsed_seconds: f64,
}

impl ExecutionOutcome {
    /// A successful outcome.
    pub fn success(script_name: impl Into<String>, elapsed_seconds: f64) -> Self {
        Self {
            script_name: script_name.into(),
            succeeded: true,
            error_message: None,
            elapsed_seconds,
        }
    }

    /// A failure outcome carrying the error message.
    pub fn failure(
        script_name: impl Into<String>,
        message: impl Into<String>,
        elapsed_seconds: f64,
    ) -> Self {
        Self {
            script_name: script_name.into(),
            succeeded: false,
            error_message: Some(message.into()),
            elapsed_seconds,
        }
    }
}

/// Executes decoded script text against a database handle.
pub struct ScriptExecutor {
    /// Target database; evals run in this database's context
    db: Database,
}

impl ScriptExecutor {
    /// Create an executor over the given database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Evaluate a script server-side and report the outcome.
    ///
    /// The decoded text becomes the body of a zero-argument function
    /// submitted via the `eval` command. Server-reported failures are
    /// logged as warnings, local/transport failures as errors; neither
    /// propagates. The batch always continues to the next file.
    pub async fn execute(&self, script: &ScriptFile, source: &str) -> ExecutionOutcome {
        info!(script = %script.name, "executing script");

        let command = eval_command(source);
        let started = Instant::now();
        let result = self.db.run_command(command).await;
        let elapsed = started.elapsed().as_secs_f64();

        outcome_from_result(&script.name, result, elapsed)
    }
}

/// Build the `eval` command wrapping the text as an anonymous function.
fn eval_command(source: &str) -> Document {
    doc! {
        "eval": format!("(function() {{{source}}})();"),
        "args": [],
    }
}

/// Convert a driver result into an outcome, logging as a side effect.
fn outcome_from_result(
    name: &str,
    result: mongodb::error::Result<Document>,
    elapsed_seconds: f64,
) -> ExecutionOutcome {
    match result {
        Ok(_) => {
            info!(script = %name, "script executed successfully");
            ExecutionOutcome::success(name, elapsed_seconds)
        }
        Err(e) if is_server_error(&e) => {
            let message = extract_error_info(&e).summary();
            warn!(script = %name, error = %message, "server rejected script");
            ExecutionOutcome::failure(name, message, elapsed_seconds)
        }
        Err(e) => {
            let message = extract_error_info(&e).summary();
            error!(script = %name, error = %message, "error executing script");
            ExecutionOutcome::failure(name, message, elapsed_seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_command_wraps_as_anonymous_function() {
        let command = eval_command("\ndb.users.insert({});");
        assert_eq!(
            command.get_str("eval").unwrap(),
            "(function() {\ndb.users.insert({});})();"
        );
        assert!(command.get_array("args").unwrap().is_empty());
    }

    #[test]
    fn test_ok_result_is_success_outcome() {
        let outcome = outcome_from_result("a.js", Ok(doc! { "ok": 1 }), 0.25);
        assert!(outcome.succeeded);
        assert!(outcome.error_message.is_none());
        assert_eq!(outcome.script_name, "a.js");
        assert_eq!(outcome.elapsed_seconds, 0.25);
    }

    #[test]
    fn test_transport_error_is_failure_outcome_not_panic() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let outcome = outcome_from_result("a.js", Err(io_err.into()), 0.1);
        assert!(!outcome.succeeded);
        assert!(outcome.error_message.is_some());
    }

    #[test]
    fn test_outcome_constructors() {
        let ok = ExecutionOutcome::success("a.js", 1.5);
        assert!(ok.succeeded);

        let bad = ExecutionOutcome::failure("b.js", "ReferenceError: x is not defined", 0.2);
        assert!(!bad.succeeded);
        assert_eq!(
            bad.error_message.as_deref(),
            Some("ReferenceError: x is not defined")
        );
    }
}
