//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - dispatches to the intraday / long-charts pipelines
//! - prints run summaries

use clap::Parser;

use crate::cli::{Cli, Command};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `qbit5` binary.
pub fn run() -> Result<(), AppError> {
    // Load .env before clap resolves env-backed arguments (QBIT5_OUT_DIR).
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::Intraday(args) => {
            let run = pipeline::run_intraday(&args)?;
            println!("{}", crate::report::format_intraday_summary(&run));
            Ok(())
        }
        Command::Charts(args) => {
            let run = pipeline::run_long_charts(&args)?;
            println!("{}", crate::report::format_charts_summary(&run));
            Ok(())
        }
    }
}
