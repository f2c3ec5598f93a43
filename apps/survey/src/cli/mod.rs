//! # Survey CLI Module
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP form server
//! - `catalog` - Print the indicator catalog
//! - `submit` - Submit a response file
//! - `rows` - List rows stored by the local backend
//! - `init` - Create the local row database

mod commands;

use crate::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use survey_core::SurveyError;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Environmental indicator survey
///
/// Collects indicator selections and ratings from professionals and appends
/// them to a spreadsheet.
#[derive(Parser, Debug)]
#[command(name = "survey")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to survey.toml (falls back to SURVEY_CONFIG, then ./survey.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides [server].host)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides [server].port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the indicator catalog
    Catalog,

    /// Validate a response file and append it to the store
    Submit {
        /// Path to the response file (TOML)
        #[arg(short, long)]
        file: PathBuf,

        /// Validate and print rows without touching the store
        #[arg(long)]
        dry_run: bool,
    },

    /// List rows held by the local or memory backend
    Rows {
        /// Show only the last N rows
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Create the local row database
    Init {
        /// Recreate the database even if it exists
        #[arg(short, long)]
        force: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), SurveyError> {
    let config = Config::load(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(config, host, port).await,
        Some(Commands::Catalog) | None => cmd_catalog(&config, json_mode, cli.verbose),
        Some(Commands::Submit { file, dry_run }) => {
            cmd_submit(&config, json_mode, cli.verbose, &file, dry_run).await
        }
        Some(Commands::Rows { limit }) => cmd_rows(&config, json_mode, cli.verbose, limit),
        Some(Commands::Init { force }) => cmd_init(&config, force),
    }
}
