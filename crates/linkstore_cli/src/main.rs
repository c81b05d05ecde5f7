//! LinkStore CLI
//!
//! Command-line tools for looking into a LinkStore directory.
//!
//! The CLI never takes the store lock and never writes: it can be pointed
//! at the directory of a running service.
//!
//! # Commands
//!
//! - `inspect` - Display sizes, record counts and the recovered last ID
//! - `get` - Print records by ID
//! - `staged` - Print the records left in the staging log
//! - `verify` - Check that every line of both logs decodes

mod commands;

use clap::{Parser, Subcommand};
use linkstore_core::RecordId;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// LinkStore command-line tools.
#[derive(Parser)]
#[command(name = "linkstore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store directory (defaults to $STORAGE_DIR_PATH)
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Record log file name (defaults to $STORAGE_FILE_NAME or links.jsonl)
    #[arg(global = true, long)]
    file_name: Option<String>,

    /// Staging log file name (defaults to $STORAGE_TEMP_FILE_NAME or links.staging.jsonl)
    #[arg(global = true, long)]
    staging_file_name: Option<String>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display log sizes, record counts and the recovered last ID
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print committed records by ID
    Get {
        /// Record IDs to look up
        #[arg(required = true)]
        ids: Vec<RecordId>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print records left in the staging log
    Staged {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Check that every line of both logs decodes
    Verify,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Version = cli.command {
        println!("LinkStore CLI v{}", env!("CARGO_PKG_VERSION"));
        println!("LinkStore Core v{}", linkstore_core::VERSION);
        return Ok(());
    }

    let config = commands::resolve_config(cli.path, cli.file_name, cli.staging_file_name)?;

    match cli.command {
        Commands::Inspect { format } => commands::inspect::run(&config, &format)?,
        Commands::Get { ids, format } => commands::get::run(&config, &ids, &format)?,
        Commands::Staged { format } => commands::staged::run(&config, &format)?,
        Commands::Verify => commands::verify::run(&config)?,
        Commands::Version => {}
    }

    Ok(())
}
