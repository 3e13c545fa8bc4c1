//! Error handling module for batch operations.
//!
//! This module provides error handling for the script batch runner with:
//! - A small, layered error taxonomy (configuration, connection, script)
//! - Structured error information extraction from MongoDB driver errors
//! - Consistent JSON error formatting for logging
//!
//! # Example
//!
//! ```rust,no_run
//! use mongobatch::error::Result;
//!
//! fn example_operation() -> Result<()> {
//!     // Driver errors convert into BatchError automatically via `?`.
//!     Ok(())
//! }
//!
//! fn handle_error(err: &mongodb::error::Error) {
//!     let info = mongobatch::error::mongo::extract_error_info(err);
//!     println!("{}", info.summary());
//! }
//! ```

pub mod kinds;
pub mod mongo;

// Re-export commonly used types
pub use kinds::{BatchError, ConfigError, ConnectionError, Result, ScriptError};
pub use mongo::{ErrorInfo, extract_error_info, is_server_error};
