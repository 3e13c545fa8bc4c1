//! Command-line interface for mongobatch
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and CLI-override merging
//! - Subcommand selection (migrate, train, drop)

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;

/// Deterministic MongoDB script batch runner
#[derive(Parser, Debug)]
#[command(
    name = "mongobatch",
    version,
    about = "Apply ordered directories of scripts to a MongoDB database",
    long_about = "A build-time data-loading tool: point it at a directory of scripts and a
target database, and it replays them server-side in filename order."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Server to connect to (single-host mode)
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to connect to
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Replica-set seed list, e.g. "db1:27017,db2,db3:27018"
    #[arg(long = "replica-set", value_name = "SEEDS")]
    pub replica_set: Option<String>,

    /// Target database name
    #[arg(long, value_name = "NAME")]
    pub database: Option<String>,

    /// Username for authentication
    #[arg(short = 'u', long, value_name = "USERNAME")]
    pub username: Option<String>,

    /// Password for authentication
    #[arg(short = 'p', long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Named credential entry from the config file
    #[arg(long = "credential-ref", value_name = "NAME")]
    pub credential_ref: Option<String>,

    /// Character encoding of script files (default: UTF-8)
    #[arg(long, value_name = "CHARSET")]
    pub encoding: Option<String>,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for mongobatch
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run migration script directories
    Migrate {
        /// Script directories (falls back to `batch.migration_dirs` from config)
        #[arg(value_name = "DIR")]
        dirs: Vec<PathBuf>,
    },

    /// Run training script directories (same behavior, different wiring)
    Train {
        /// Script directories (falls back to `batch.training_dirs` from config)
        #[arg(value_name = "DIR")]
        dirs: Vec<PathBuf>,
    },

    /// Drop the configured database
    Drop,
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration with CLI overrides applied
    config: Config,
}

impl CliInterface {
    /// Parse arguments and load the effective configuration.
    pub fn new() -> Result<Self> {
        let args = CliArgs::parse();
        let config = Self::load_config(&args)?;

        Ok(Self { args, config })
    }

    /// Build an interface from pre-parsed arguments (used in tests).
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge CLI overrides on top.
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load(args.config_file.as_deref())?;
        Self::apply_args_to_config(&mut config, args);
        Ok(config)
    }

    /// Apply CLI arguments over file-loaded values.
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        if let Some(host) = &args.host {
            config.connection.hostname = Some(host.clone());
        }
        if let Some(port) = args.port {
            config.connection.port = Some(port);
        }
        if let Some(seeds) = &args.replica_set {
            config.connection.replica_set = Some(seeds.clone());
        }
        if let Some(database) = &args.database {
            config.connection.database = database.clone();
        }
        if let Some(username) = &args.username {
            config.connection.username = Some(username.clone());
        }
        if let Some(password) = &args.password {
            config.connection.password = Some(password.clone());
        }
        if let Some(reference) = &args.credential_ref {
            config.connection.credential_ref = Some(reference.clone());
        }
        if let Some(encoding) = &args.encoding {
            config.batch.script_encoding = Some(encoding.clone());
        }
    }

    /// The parsed arguments.
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// The effective configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Script directories for the selected subcommand: the positional
    /// arguments when given, the config defaults otherwise.
    pub fn script_directories(&self) -> Vec<PathBuf> {
        match &self.args.command {
            Commands::Migrate { dirs } if !dirs.is_empty() => dirs.clone(),
            Commands::Migrate { .. } => self.config.batch.migration_dirs.clone(),
            Commands::Train { dirs } if !dirs.is_empty() => dirs.clone(),
            Commands::Train { .. } => self.config.batch.training_dirs.clone(),
            Commands::Drop => Vec::new(),
        }
    }
}
