//! # CLI Module
//!
//! This module defines the command-line interface for langcensus using `clap`.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scan` | Run the language census and write the workbook |
//! | `init` | Write a starter configuration file |
//!
//! ## Global Options
//!
//! - `-v, --verbose` - Increase verbosity level (use multiple times: -v, -vv, -vvv)
//! - `-c, --config <FILE>` - Path to configuration file
//!
//! ## Examples
//!
//! ```bash
//! # Write .langcensus.toml
//! langcensus init
//!
//! # Scan two projects of a workspace
//! BB_USER=alice BB_APP_PASSWORD=... langcensus scan -w acme -p CORE,WEB
//! ```

pub mod commands;
pub mod exit_codes;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{InitArgs, ScanArgs};
use crate::error::CensusError;

/// langcensus - Language breakdown of every repository in Bitbucket projects
#[derive(Parser, Debug)]
#[command(name = "langcensus")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan the configured projects and write the language workbook
    Scan(ScanArgs),

    /// Write a starter configuration file
    Init(InitArgs),
}

/// Execute the parsed command and return its exit code
pub async fn run(cli: Cli) -> Result<i32, CensusError> {
    match cli.command {
        Commands::Scan(args) => commands::scan::execute(args, cli.config.as_deref()).await,
        Commands::Init(args) => commands::init::execute(args).await,
    }
}
