//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during a run
//! - exported to JSON/CSV artifacts
//! - reloaded later (the levels log is the only long-lived state)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Fixed index membership, equal weighted. No rebalancing.
pub const TICKERS: [&str; 5] = ["IONQ", "QBTS", "RGTI", "ARQQ", "QUBT"];

/// The level series is rebased so that `level(base_date) == 100`.
pub const BASE_LEVEL: f64 = 100.0;

/// Index base date: first US trading day of 2024.
pub fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid base date")
}

/// One row of the rebased historical index series (and of the levels log).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelPoint {
    pub date: NaiveDate,
    pub level: f64,
}

/// One point of the intraday series: equal-weight percent change of the
/// basket versus each constituent's own open, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntradayPoint {
    pub timestamp: DateTime<Utc>,
    pub pct_vs_open: f64,
}

/// The published stats record, overwritten in place on every intraday run.
///
/// The JSON schema is consumed by the static site and is a stable contract:
/// exactly these three keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Intraday percent change of the basket vs the day's open.
    pub pct_intraday: f64,
    /// Local publication timestamp, `YYYY/MM/DD HH:MM`.
    pub updated_at: String,
    /// Last level in the levels log.
    pub last_level: f64,
}
