//! apo CLI
//!
//! Command-line tools for inspecting apo log files.
//!
//! # Commands
//!
//! - `inspect` - Display header, footer and size information
//! - `verify` - Read every record and report the first failure
//! - `dump` - List records, optionally decoding their data with a shape

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// apo log file tools.
#[derive(Parser)]
#[command(name = "apo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the log file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display header, footer and size information
    Inspect {
        /// List every footer offset
        #[arg(short, long)]
        offsets: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Verify that every record can be read
    Verify {
        /// Also decode each record's data with this shape, e.g. "{id: u64}"
        #[arg(short, long)]
        shape: Option<String>,
    },

    /// Dump records for debugging
    Dump {
        /// Decode record data with this shape, e.g. "{id: u64, tags: [str]}"
        #[arg(short, long)]
        shape: Option<String>,

        /// First record index to dump
        #[arg(long, default_value = "0")]
        start: u64,

        /// Maximum number of records to dump
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

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
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { offsets, format } => {
            let path = cli.path.ok_or("Log path required for inspect")?;
            commands::inspect::run(&path, offsets, &format)?;
        }
        Commands::Verify { shape } => {
            let path = cli.path.ok_or("Log path required for verify")?;
            commands::verify::run(&path, shape.as_deref())?;
        }
        Commands::Dump {
            shape,
            start,
            limit,
            format,
        } => {
            let path = cli.path.ok_or("Log path required for dump")?;
            commands::dump::run(&path, shape.as_deref(), start, limit, &format)?;
        }
        Commands::Version => {
            println!("apo CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("apo core v{}", apo_core::VERSION);
        }
    }

    Ok(())
}
