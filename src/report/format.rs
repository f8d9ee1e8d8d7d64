//! Human-readable formatting.
//!
//! We keep formatting code in one place so:
//! - the index math stays clean and testable
//! - output changes are localized (the post line is a published contract)

use crate::app::pipeline::{ChartsRun, IntradayRun};

/// Local publication timestamp format, used in the stats JSON, the post
/// line, and chart titles.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M";

pub fn local_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Signed percentage with two decimals; the sign is always shown.
///
/// `1.234 -> "+1.23%"`, `-0.5 -> "-0.50%"`, `0.0 -> "+0.00%"`.
pub fn fmt_signed_pct(pct: f64) -> String {
    format!("{pct:+.2}%")
}

/// The one-line intraday post, verbatim as published:
/// `QBIT-5 <sign><value>% (YYYY/MM/DD HH:MM)`.
pub fn post_line(pct: f64, at: &str) -> String {
    format!("QBIT-5 {} ({at})", fmt_signed_pct(pct))
}

/// Terminal summary for a completed intraday run.
pub fn format_intraday_summary(run: &IntradayRun) -> String {
    let mut out = String::new();
    out.push_str("=== qbit5 - intraday snapshot ===\n");
    out.push_str(&format!("Trading day: {}\n", run.trading_day));
    out.push_str(&format!("Points: {}\n", run.series.len()));
    out.push_str(&format!(
        "Intraday: {} | last level: {:.2}\n",
        fmt_signed_pct(run.stats.pct_intraday),
        run.stats.last_level
    ));
    out.push_str(&format!("Post: {}\n", run.post));
    out
}

/// Terminal summary for a completed long-charts run.
pub fn format_charts_summary(run: &ChartsRun) -> String {
    let mut out = String::new();
    out.push_str("=== qbit5 - level history ===\n");
    out.push_str(&format!("Rows: {}\n", run.levels.len()));
    if let (Some(first), Some(last)) = (run.levels.first(), run.levels.last()) {
        out.push_str(&format!(
            "Range: {} ({:.2}) -> {} ({:.2})\n",
            first.date, first.level, last.date, last.level
        ));
    }
    out
}
