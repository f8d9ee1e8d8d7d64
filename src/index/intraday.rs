//! Intraday equal-weight series construction.
//!
//! From per-constituent 1-minute bars (several days' worth) we:
//!
//! 1. assign each bar to its US trading date (America/New_York)
//! 2. pick the latest trading date with enough samples across the basket
//! 3. build the equal-weight percent-vs-open series for that day
//!
//! Within the selected day each constituent's last seen price is carried
//! forward, so a point is only emitted once every constituent has printed
//! at least once. The basket is always complete; we never reweight.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::America::New_York;

use crate::domain::{IntradayPoint, TICKERS};
use crate::error::AppError;

/// One 1-minute bar, keyed by its UTC timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinuteBar {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

/// The US trading date a bar belongs to.
pub fn trading_date(timestamp: DateTime<Utc>) -> NaiveDate {
    timestamp.with_timezone(&New_York).date_naive()
}

/// Pick the latest trading date carrying at least `min_samples` bars across
/// the whole basket. Returns `None` when no day qualifies.
pub fn latest_trading_date(
    bars: &HashMap<String, Vec<MinuteBar>>,
    min_samples: usize,
) -> Option<NaiveDate> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for series in bars.values() {
        for bar in series {
            *counts.entry(trading_date(bar.timestamp)).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .filter(|&(_, n)| n >= min_samples)
        .map(|(date, _)| date)
        .last()
}

/// Build the equal-weight percent-vs-open series for one trading date.
///
/// Fails with a `Data` error when the resulting series is empty (e.g. a
/// constituent never printed on that day).
pub fn equal_weight_intraday(
    bars: &HashMap<String, Vec<MinuteBar>>,
    date: NaiveDate,
) -> Result<Vec<IntradayPoint>, AppError> {
    // Pivot: timestamp -> ticker -> close, last write wins on duplicates.
    let mut pivot: BTreeMap<DateTime<Utc>, HashMap<&str, f64>> = BTreeMap::new();
    let mut opens: HashMap<&str, f64> = HashMap::new();

    for ticker in TICKERS {
        let series = bars
            .get(ticker)
            .ok_or_else(|| AppError::data(format!("No intraday bars for {ticker}.")))?;
        let mut day_bars: Vec<&MinuteBar> = series
            .iter()
            .filter(|b| trading_date(b.timestamp) == date)
            .filter(|b| b.close.is_finite() && b.close > 0.0)
            .collect();
        day_bars.sort_by_key(|b| b.timestamp);

        if let Some(first) = day_bars.first() {
            opens.insert(ticker, first.close);
        }
        for bar in day_bars {
            pivot.entry(bar.timestamp).or_default().insert(ticker, bar.close);
        }
    }

    if opens.len() < TICKERS.len() {
        let missing: Vec<&str> = TICKERS
            .iter()
            .copied()
            .filter(|t| !opens.contains_key(t))
            .collect();
        return Err(AppError::data(format!(
            "No intraday prints on {date} for: {}.",
            missing.join(", ")
        )));
    }

    let mut latest: HashMap<&str, f64> = HashMap::new();
    let mut out = Vec::with_capacity(pivot.len());

    for (timestamp, prices) in pivot {
        for (&ticker, &close) in &prices {
            latest.insert(ticker, close);
        }
        // Skip leading timestamps until every constituent has printed once.
        if latest.len() < TICKERS.len() {
            continue;
        }
        let mut sum = 0.0;
        for ticker in TICKERS {
            sum += latest[ticker] / opens[ticker] - 1.0;
        }
        out.push(IntradayPoint {
            timestamp,
            pct_vs_open: 100.0 * sum / TICKERS.len() as f64,
        });
    }

    if out.is_empty() {
        return Err(AppError::data(format!(
            "Empty intraday series for {date}; not publishing."
        )));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(h: u32, m: u32) -> DateTime<Utc> {
        // 14:30 UTC == 09:30 New York during US daylight saving time.
        Utc.with_ymd_and_hms(2025, 6, 2, h, m, 0).unwrap()
    }

    fn flat_bars(price: f64, minutes: &[(u32, u32)]) -> Vec<MinuteBar> {
        minutes
            .iter()
            .map(|&(h, m)| MinuteBar {
                timestamp: ts(h, m),
                close: price,
            })
            .collect()
    }

    fn all_tickers(bars: Vec<MinuteBar>) -> HashMap<String, Vec<MinuteBar>> {
        TICKERS
            .iter()
            .map(|t| (t.to_string(), bars.clone()))
            .collect()
    }

    #[test]
    fn trading_date_uses_new_york_calendar() {
        // 01:00 UTC on June 3 is still June 2 in New York.
        let t = Utc.with_ymd_and_hms(2025, 6, 3, 1, 0, 0).unwrap();
        assert_eq!(trading_date(t), NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
    }

    #[test]
    fn latest_trading_date_requires_enough_samples() {
        let bars = all_tickers(flat_bars(10.0, &[(14, 30), (14, 31)]));
        // 5 tickers x 2 bars = 10 samples.
        assert!(latest_trading_date(&bars, 11).is_none());
        assert_eq!(
            latest_trading_date(&bars, 10),
            Some(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap())
        );
    }

    #[test]
    fn flat_prices_give_a_zero_series() {
        let bars = all_tickers(flat_bars(10.0, &[(14, 30), (14, 31), (14, 32)]));
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let series = equal_weight_intraday(&bars, date).unwrap();
        assert_eq!(series.len(), 3);
        assert!(series.iter().all(|p| p.pct_vs_open.abs() < 1e-12));
    }

    #[test]
    fn uniform_move_is_reflected_one_to_one() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let mut bars = HashMap::new();
        for ticker in TICKERS {
            bars.insert(
                ticker.to_string(),
                vec![
                    MinuteBar { timestamp: ts(14, 30), close: 100.0 },
                    MinuteBar { timestamp: ts(14, 31), close: 102.0 },
                ],
            );
        }
        let series = equal_weight_intraday(&bars, date).unwrap();
        assert!((series.last().unwrap().pct_vs_open - 2.0).abs() < 1e-9);
    }

    #[test]
    fn constituent_without_prints_fails_the_day() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let mut bars = all_tickers(flat_bars(10.0, &[(14, 30)]));
        bars.insert("QUBT".to_string(), Vec::new());
        let err = equal_weight_intraday(&bars, date).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Data);
    }

    #[test]
    fn last_price_is_carried_forward_within_the_day() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let mut bars = all_tickers(flat_bars(10.0, &[(14, 30), (14, 31), (14, 32)]));
        // QUBT only prints on the first minute; its open carries forward,
        // so later points still have a complete basket.
        bars.insert("QUBT".to_string(), flat_bars(20.0, &[(14, 30)]));
        let series = equal_weight_intraday(&bars, date).unwrap();
        assert_eq!(series.len(), 3);
        assert!(series.iter().all(|p| p.pct_vs_open.abs() < 1e-12));
    }
}
