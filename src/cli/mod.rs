//! Command-line parsing for the QBIT-5 pipeline.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the index math and artifact writers.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "qbit5", version, about = "QBIT-5 equal-weight quantum index publisher")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands: the two manually-triggered jobs.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch intraday prices, update the stats/post/CSV artifacts, and
    /// render the intraday chart.
    Intraday(IntradayArgs),
    /// Fetch daily history since the base date, upsert the levels log, and
    /// render the 7d/1m/1y charts.
    Charts(ChartsArgs),
}

/// Options for the intraday snapshot job.
#[derive(Debug, Parser, Clone)]
pub struct IntradayArgs {
    /// Output directory for published artifacts.
    #[arg(long, env = "QBIT5_OUT_DIR", default_value = "docs/outputs")]
    pub out_dir: PathBuf,

    /// Minimum 1-minute samples (across the basket) to accept a trading day.
    #[arg(long, default_value_t = 30)]
    pub min_samples: usize,

    /// Skip chart rendering; publish numeric artifacts only.
    #[arg(long)]
    pub no_chart: bool,
}

/// Options for the long-history chart job.
#[derive(Debug, Parser, Clone)]
pub struct ChartsArgs {
    /// Output directory for published artifacts.
    #[arg(long, env = "QBIT5_OUT_DIR", default_value = "docs/outputs")]
    pub out_dir: PathBuf,

    /// Update the levels log but skip chart rendering.
    #[arg(long)]
    pub no_chart: bool,
}
