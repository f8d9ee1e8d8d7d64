//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the index definition constants (`TICKERS`, `base_date`)
//! - series points (`LevelPoint`, `IntradayPoint`)
//! - the published stats record (`StatsSnapshot`)

pub mod types;

pub use types::*;
