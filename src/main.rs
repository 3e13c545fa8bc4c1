//! mongobatch - deterministic MongoDB script batch runner
//!
//! A build-time data-loading tool: it connects to a MongoDB deployment
//! (single host or replica set), authenticates, and replays directories of
//! administrative scripts server-side in filename order.

use tracing::Level;

mod cli;
mod config;
mod connection;
mod endpoint;
mod error;
mod executor;
mod runner;
mod script;

use cli::{CliInterface, Commands};
use error::Result;
use runner::{BatchRunner, summarize};

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Dispatch the selected subcommand
///
/// Configuration, connectivity, and directory-level errors bubble up here
/// and exit non-zero. Individual script failures are logged and summarized
/// but leave the exit code at zero.
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    let runner = BatchRunner::new(cli.config().clone());

    match cli.args().command {
        Commands::Migrate { .. } | Commands::Train { .. } => {
            let outcomes = runner.run(&cli.script_directories()).await?;
            let (succeeded, failed) = summarize(&outcomes);
            println!("{} script(s) executed, {} failed", succeeded + failed, failed);
        }
        Commands::Drop => {
            runner.drop_database().await?;
            println!("Database dropped");
        }
    }

    Ok(())
}

/// Initialize logging from verbosity flags and configuration.
fn initialize_logging(cli: &CliInterface) {
    let level = if cli.args().very_verbose {
        Level::TRACE
    } else if cli.args().verbose {
        Level::DEBUG
    } else if cli.args().quiet {
        Level::ERROR
    } else {
        cli.config().logging.level.to_tracing_level()
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}
