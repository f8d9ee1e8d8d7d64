//! The two job pipelines shared by the CLI front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//!
//! - intraday: fetch 1m bars -> pick trading day -> equal-weight series
//!   -> publish numeric artifacts -> render chart
//! - long charts: fetch daily history -> rebased level series -> upsert
//!   levels log -> render trailing-window charts
//!
//! Ordering matters: numeric artifacts are published only after the whole
//! computation succeeded, and charts render last so a rendering failure can
//! never block or roll back the numbers.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::cli::{ChartsArgs, IntradayArgs};
use crate::data::YahooClient;
use crate::domain::{LevelPoint, StatsSnapshot, TICKERS, base_date};
use crate::error::AppError;
use crate::index::{
    MinuteBar, equal_weight_intraday, latest_trading_date, rebased_series, trailing_window,
};
use crate::report::{local_timestamp, post_line};

/// Trailing windows for the published level charts, matching the site:
/// 7 calendar days, ~1 month, ~1 year.
const WINDOWS: [(&str, i64, &str); 3] = [
    ("qbit_5_7d.png", 7, "QBIT-5 (7D)"),
    ("qbit_5_1m.png", 35, "QBIT-5 (1M)"),
    ("qbit_5_1y.png", 400, "QBIT-5 (1Y)"),
];

/// All computed outputs of a `qbit5 intraday` run.
#[derive(Debug, Clone)]
pub struct IntradayRun {
    pub trading_day: NaiveDate,
    pub series: Vec<crate::domain::IntradayPoint>,
    pub stats: StatsSnapshot,
    pub post: String,
}

/// All computed outputs of a `qbit5 charts` run.
#[derive(Debug, Clone)]
pub struct ChartsRun {
    pub levels: Vec<LevelPoint>,
}

/// Execute the intraday snapshot job.
pub fn run_intraday(args: &IntradayArgs) -> Result<IntradayRun, AppError> {
    // 1) Fetch recent 1-minute bars for the whole basket.
    let client = YahooClient::new()?;
    let mut bars: HashMap<String, Vec<MinuteBar>> = HashMap::new();
    for ticker in TICKERS {
        bars.insert(ticker.to_string(), client.fetch_intraday(ticker)?);
    }

    // 2) Pick the latest sufficiently-sampled trading day (falls back to the
    //    prior session on holidays and before the open).
    let trading_day = latest_trading_date(&bars, args.min_samples).ok_or_else(|| {
        AppError::data(format!(
            "No trading day in the last 5 days has >= {} samples; market likely closed.",
            args.min_samples
        ))
    })?;

    // 3) Build the equal-weight percent-vs-open series.
    let series = equal_weight_intraday(&bars, trading_day)?;
    let pct_intraday = series
        .last()
        .map(|p| p.pct_vs_open)
        .ok_or_else(|| AppError::data("Intraday series is empty."))?;

    // 4) Assemble the snapshot. The levels log must already exist so that
    //    `last_level` is a real number in the published JSON.
    let out_dir = ensure_out_dir(&args.out_dir)?;
    let last_level = crate::io::last_level(&out_dir.join("qbit_5_levels.csv"))?;
    let updated_at = local_timestamp();
    let stats = StatsSnapshot {
        pct_intraday: round2(pct_intraday),
        updated_at: updated_at.clone(),
        last_level: round2(last_level),
    };
    let post = post_line(pct_intraday, &updated_at);

    // 5) Publish numeric artifacts. Everything is computed by now, so a
    //    failure before this point leaves the previous run's files intact.
    crate::io::write_intraday_csv(&out_dir.join("qbit_5_intraday.csv"), &series)?;
    crate::io::write_stats_json(&out_dir.join("qbit_5_stats.json"), &stats)?;
    crate::io::write_post_text(&out_dir.join("qbit_5_post_intraday.txt"), &post)?;
    crate::io::write_last_run(&out_dir.join("last_run.txt"), &updated_at)?;

    // 6) Chart last: a rendering failure exits non-zero but the numbers are
    //    already on disk.
    if !args.no_chart {
        crate::plot::render_intraday_chart(
            &out_dir.join("qbit_5_intraday.png"),
            &series,
            &updated_at,
        )?;
    }

    Ok(IntradayRun {
        trading_day,
        series,
        stats,
        post,
    })
}

/// Execute the long-history chart job.
pub fn run_long_charts(args: &ChartsArgs) -> Result<ChartsRun, AppError> {
    // 1) Fetch daily closes since the base date for the whole basket.
    let client = YahooClient::new()?;
    let base = base_date();
    let mut history: HashMap<String, Vec<(NaiveDate, f64)>> = HashMap::new();
    for ticker in TICKERS {
        history.insert(ticker.to_string(), client.fetch_daily(ticker, base)?);
    }

    // 2) Recompute the full rebased series.
    let levels = rebased_series(base, &history)?;

    // 3) Upsert the levels log (the authoritative record).
    let out_dir = ensure_out_dir(&args.out_dir)?;
    crate::io::upsert_levels(&out_dir.join("qbit_5_levels.csv"), &levels)?;

    // 4) Render the trailing-window charts from the merged log, so manual
    //    corrections in the CSV survive into the images.
    if !args.no_chart {
        let merged = crate::io::read_levels(&out_dir.join("qbit_5_levels.csv"))?;
        for (file, days, title) in WINDOWS {
            let window = trailing_window(&merged, days);
            crate::plot::render_level_chart(&out_dir.join(file), &window, title)?;
        }
    }

    Ok(ChartsRun { levels })
}

fn ensure_out_dir(dir: &Path) -> Result<PathBuf, AppError> {
    fs::create_dir_all(dir).map_err(|e| {
        AppError::write(format!("Failed to create output directory '{}': {e}", dir.display()))
    })?;
    Ok(dir.to_path_buf())
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_matches_published_precision() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(-0.567), -0.57);
        assert_eq!(round2(100.0), 100.0);
    }

    #[test]
    fn windows_cover_the_three_published_charts() {
        let files: Vec<&str> = WINDOWS.iter().map(|w| w.0).collect();
        assert_eq!(files, ["qbit_5_7d.png", "qbit_5_1m.png", "qbit_5_1y.png"]);
    }
}
