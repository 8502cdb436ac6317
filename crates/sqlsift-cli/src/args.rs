//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "sqlsift")]
#[command(author, version, about = "Summarize SQL activity recorded in JDBC query logs")]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Analyze log files and report the schema/table/column inventory
    Analyze {
        /// Log files to analyze (supports glob patterns)
        files: Vec<PathBuf>,

        /// Path to configuration file (default: search for sqlsift.toml)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Write the report to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Skip missing files and patterns that match nothing
        #[arg(long)]
        allow_missing: bool,

        /// Exit with status 1 when any statement could not be analyzed
        #[arg(long)]
        fail_on_unparsed: bool,
    },

    /// Print the query events extracted from a log file as JSON
    Events {
        /// Log file to read
        file: PathBuf,
    },

    /// Print the schema/table/column inventory of log files as JSON
    Inventory {
        /// Log files to analyze (supports glob patterns)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Human,
    /// JSON summary
    Json,
}
