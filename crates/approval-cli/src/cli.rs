//! CLI argument definitions using clap.

use std::path::PathBuf;

use approval::sink::OutputFormat;
use clap::{Parser, Subcommand};

/// Approval: review AI-scored invoice requests
#[derive(Parser)]
#[command(name = "approval")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the approval model on synthetic data
    Train {
        /// Output path for the model file (default: model_path from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of synthetic samples
        #[arg(long, default_value = "2500")]
        samples: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Gradient descent epochs
        #[arg(long, default_value = "400")]
        epochs: usize,
    },

    /// Generate a timestamped file of synthetic requests
    Generate {
        /// Number of requests
        #[arg(short = 'n', long, default_value = "100")]
        count: usize,

        /// Directory for the generated file
        #[arg(short, long, default_value = "input")]
        output_dir: PathBuf,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Review a batch in the terminal, one request at a time
    Review {
        /// Requests file to review instead of a generated batch
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Discard any saved progress and start a new batch
        #[arg(long)]
        fresh: bool,

        /// Output format for final results
        #[arg(short, long, default_value = "csv")]
        format: OutputFormat,

        /// Random seed for the generated batch
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Start the review API server
    Serve {
        /// Port for the server (default: server.port from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show review progress and summary
    Status {
        /// Snapshot file (default: snapshot_path from config)
        #[arg(value_name = "SNAPSHOT")]
        snapshot: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
