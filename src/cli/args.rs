//! Command line argument parsing for the Tessera CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tessera - statistically balanced segmentation for mixed-script text
#[derive(Parser, Debug, Clone)]
#[command(name = "tessera")]
#[command(about = "Statistically balanced segmentation for mixed-script text")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Tessera Contributors")]
#[command(long_about = None)]
pub struct TesseraArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl TesseraArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Balance text into evenly weighted segments
    Balance(BalanceArgs),

    /// Tokenize and classify text without balancing
    Tokenize(TokenizeArgs),

    /// Show length statistics for tokenized text
    Stats(StatsArgs),
}

/// Arguments for balancing
#[derive(Parser, Debug, Clone)]
pub struct BalanceArgs {
    /// Text to process (reads the input file or stdin when omitted)
    #[arg(value_name = "TEXT", conflicts_with = "input")]
    pub text: Option<String>,

    /// Input file path
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Seed for label assignment (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for tokenizing
#[derive(Parser, Debug, Clone)]
pub struct TokenizeArgs {
    /// Text to process (reads the input file or stdin when omitted)
    #[arg(value_name = "TEXT", conflicts_with = "input")]
    pub text: Option<String>,

    /// Input file path
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,
}

/// Arguments for statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Text to process (reads the input file or stdin when omitted)
    #[arg(value_name = "TEXT", conflicts_with = "input")]
    pub text: Option<String>,

    /// Input file path
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
