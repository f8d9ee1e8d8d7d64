//! Equal-weight index level calculation and rebasing.
//!
//! The index is defined as:
//!
//! ```text
//! level(t) = 100 * mean_over_constituents(price_i(t) / price_i(base_date))
//! ```
//!
//! A level is only defined for a complete basket. A missing, zero, or
//! non-positive constituent price makes that datapoint undefined; we never
//! reweight the remaining names.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::domain::{BASE_LEVEL, LevelPoint, TICKERS};
use crate::error::AppError;

/// Compute the index level for one basket of current prices against one
/// basket of base-date prices.
///
/// Both maps must contain a positive price for every constituent.
pub fn index_level(
    base: &HashMap<String, f64>,
    current: &HashMap<String, f64>,
) -> Result<f64, AppError> {
    let mut sum = 0.0;
    for ticker in TICKERS {
        let p_base = basket_price(base, ticker, "base date")?;
        let p_now = basket_price(current, ticker, "current")?;
        sum += p_now / p_base;
    }
    Ok(BASE_LEVEL * sum / TICKERS.len() as f64)
}

fn basket_price(basket: &HashMap<String, f64>, ticker: &str, when: &str) -> Result<f64, AppError> {
    let price = basket
        .get(ticker)
        .copied()
        .ok_or_else(|| AppError::data(format!("Missing {when} price for {ticker}.")))?;
    if !(price.is_finite() && price > 0.0) {
        return Err(AppError::data(format!(
            "Invalid {when} price for {ticker}: {price}."
        )));
    }
    Ok(price)
}

/// Percent change between two levels: `100 * (current - previous) / previous`.
pub fn pct_change(previous: f64, current: f64) -> Result<f64, AppError> {
    if !(previous.is_finite() && current.is_finite()) || previous == 0.0 {
        return Err(AppError::data(format!(
            "Percent change undefined for previous={previous}, current={current}."
        )));
    }
    Ok(100.0 * (current - previous) / previous)
}

/// Build the full rebased level series from per-constituent daily closes.
///
/// Rules:
/// - every constituent must have a close on the base date (fatal otherwise)
/// - a level is emitted only for dates where **all five** constituents
///   traded (common-date intersection); other dates are dropped, never
///   partially reweighted
/// - output is sorted ascending by date
pub fn rebased_series(
    base_date: NaiveDate,
    history: &HashMap<String, Vec<(NaiveDate, f64)>>,
) -> Result<Vec<LevelPoint>, AppError> {
    let mut maps: HashMap<&str, HashMap<NaiveDate, f64>> = HashMap::new();
    for ticker in TICKERS {
        let series = history
            .get(ticker)
            .ok_or_else(|| AppError::data(format!("No daily history for {ticker}.")))?;
        let map: HashMap<NaiveDate, f64> = series
            .iter()
            .filter(|(_, close)| close.is_finite() && *close > 0.0)
            .map(|&(date, close)| (date, close))
            .collect();
        if !map.contains_key(&base_date) {
            return Err(AppError::data(format!(
                "Missing base-date ({base_date}) close for {ticker}; index is undefined."
            )));
        }
        maps.insert(ticker, map);
    }

    let mut dates = common_dates(&maps);
    dates.retain(|d| *d >= base_date);
    dates.sort();

    let mut out = Vec::with_capacity(dates.len());
    for date in dates {
        let mut sum = 0.0;
        for ticker in TICKERS {
            let map = &maps[ticker];
            // Both lookups are guaranteed by the intersection/base-date checks.
            sum += map[&date] / map[&base_date];
        }
        out.push(LevelPoint {
            date,
            level: BASE_LEVEL * sum / TICKERS.len() as f64,
        });
    }

    Ok(out)
}

fn common_dates(maps: &HashMap<&str, HashMap<NaiveDate, f64>>) -> Vec<NaiveDate> {
    let mut common: Option<HashSet<NaiveDate>> = None;
    for map in maps.values() {
        let dates: HashSet<NaiveDate> = map.keys().cloned().collect();
        common = Some(match common {
            None => dates,
            Some(mut set) => {
                set.retain(|d| dates.contains(d));
                set
            }
        });
    }
    common.map(|set| set.into_iter().collect()).unwrap_or_default()
}

/// Restrict a level series to the trailing `days` calendar days, measured
/// back from the last point in the series.
pub fn trailing_window(series: &[LevelPoint], days: i64) -> Vec<LevelPoint> {
    let Some(last) = series.last() else {
        return Vec::new();
    };
    let cutoff = last.date - chrono::Duration::days(days);
    series.iter().filter(|p| p.date > cutoff).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{fmt_signed_pct, post_line};

    fn basket(prices: [(&str, f64); 5]) -> HashMap<String, f64> {
        prices.iter().map(|&(t, p)| (t.to_string(), p)).collect()
    }

    fn reference_basket() -> HashMap<String, f64> {
        basket([
            ("IONQ", 10.0),
            ("QBTS", 5.0),
            ("RGTI", 2.0),
            ("ARQQ", 1.0),
            ("QUBT", 4.0),
        ])
    }

    #[test]
    fn level_at_base_date_is_exactly_100() {
        let base = reference_basket();
        let level = index_level(&base, &base).unwrap();
        assert_eq!(level, 100.0);
    }

    #[test]
    fn uniform_scaling_scales_the_level() {
        let base = reference_basket();
        let scaled: HashMap<String, f64> =
            base.iter().map(|(t, p)| (t.clone(), p * 2.5)).collect();
        let level = index_level(&base, &scaled).unwrap();
        assert!((level - 250.0).abs() < 1e-9, "expected 250, got {level}");
    }

    #[test]
    fn missing_constituent_is_a_data_error() {
        let base = reference_basket();
        let mut current = reference_basket();
        current.remove("RGTI");
        let err = index_level(&base, &current).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Data);
    }

    #[test]
    fn zero_price_is_a_data_error() {
        let base = reference_basket();
        let mut current = reference_basket();
        current.insert("ARQQ".to_string(), 0.0);
        assert!(index_level(&base, &current).is_err());
    }

    #[test]
    fn pct_change_requires_nonzero_previous() {
        assert!((pct_change(100.0, 101.23).unwrap() - 1.23).abs() < 1e-9);
        assert!(pct_change(0.0, 100.0).is_err());
    }

    #[test]
    fn flat_basket_end_to_end() {
        // Same prices at base date and "now": level 100, +0.00%, post line.
        let base = reference_basket();
        let level = index_level(&base, &base).unwrap();
        assert_eq!(level, 100.0);

        let pct = pct_change(100.0, level).unwrap();
        assert_eq!(fmt_signed_pct(pct), "+0.00%");
        assert_eq!(
            post_line(pct, "2025/01/02 12:34"),
            "QBIT-5 +0.00% (2025/01/02 12:34)"
        );
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn history_for(
        closes: &[(NaiveDate, [f64; 5])],
    ) -> HashMap<String, Vec<(NaiveDate, f64)>> {
        let mut out: HashMap<String, Vec<(NaiveDate, f64)>> = HashMap::new();
        for &(date, prices) in closes {
            for (i, ticker) in TICKERS.iter().enumerate() {
                out.entry(ticker.to_string()).or_default().push((date, prices[i]));
            }
        }
        out
    }

    #[test]
    fn rebased_series_starts_at_100_and_stays_sorted() {
        let base = day(2024, 1, 2);
        let history = history_for(&[
            (day(2024, 1, 3), [11.0, 5.5, 2.2, 1.1, 4.4]),
            (base, [10.0, 5.0, 2.0, 1.0, 4.0]),
        ]);
        let series = rebased_series(base, &history).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, base);
        assert_eq!(series[0].level, 100.0);
        assert!((series[1].level - 110.0).abs() < 1e-9);
    }

    #[test]
    fn dates_missing_one_constituent_are_dropped() {
        let base = day(2024, 1, 2);
        let mut history = history_for(&[
            (base, [10.0, 5.0, 2.0, 1.0, 4.0]),
            (day(2024, 1, 3), [10.0, 5.0, 2.0, 1.0, 4.0]),
        ]);
        // QUBT did not trade on Jan 4; the whole datapoint must be dropped.
        for ticker in &TICKERS[..4] {
            history
                .get_mut(*ticker)
                .unwrap()
                .push((day(2024, 1, 4), 99.0));
        }
        let series = rebased_series(base, &history).unwrap();
        assert_eq!(series.len(), 2);
        assert!(series.iter().all(|p| p.date != day(2024, 1, 4)));
    }

    #[test]
    fn missing_base_date_close_is_fatal() {
        let history = history_for(&[(day(2024, 1, 3), [10.0, 5.0, 2.0, 1.0, 4.0])]);
        let err = rebased_series(day(2024, 1, 2), &history).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Data);
    }

    #[test]
    fn trailing_window_slices_from_the_last_date() {
        let series: Vec<LevelPoint> = (0..20)
            .map(|i| LevelPoint {
                date: day(2024, 1, 2) + chrono::Duration::days(i),
                level: 100.0 + i as f64,
            })
            .collect();
        let tail = trailing_window(&series, 7);
        assert_eq!(tail.len(), 7);
        assert_eq!(tail.last().unwrap().date, series.last().unwrap().date);
    }
}
