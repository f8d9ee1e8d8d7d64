//! Yahoo Finance chart-API integration for constituent prices.
//!
//! Two request shapes are used:
//!
//! - `range=5d&interval=1m` for the intraday job (recent 1-minute bars)
//! - `period1/period2&interval=1d` for the long-history job (daily closes)
//!
//! Any provider failure is fatal for the run: a public index must not be
//! published from a partial basket.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::AppError;
use crate::index::{MinuteBar, trading_date};

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "qbit5-index/0.1 (+static index publisher)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Small delay between per-symbol requests to stay polite with the API.
const INTER_REQUEST_DELAY: Duration = Duration::from_millis(200);

pub struct YahooClient {
    client: Client,
}

impl YahooClient {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::fetch(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Fetch the last five days of 1-minute bars for one symbol.
    pub fn fetch_intraday(&self, symbol: &str) -> Result<Vec<MinuteBar>, AppError> {
        let body = self.fetch_chart(symbol, &[("range", "5d"), ("interval", "1m")])?;
        let (timestamps, closes) = extract_series(symbol, body)?;

        let mut out = Vec::with_capacity(timestamps.len());
        for (ts, close) in timestamps.into_iter().zip(closes) {
            let Some(close) = valid_close(close) else {
                continue;
            };
            let timestamp = utc_timestamp(symbol, ts)?;
            out.push(MinuteBar { timestamp, close });
        }
        std::thread::sleep(INTER_REQUEST_DELAY);
        Ok(out)
    }

    /// Fetch daily closes for one symbol from `since` (inclusive) to now.
    pub fn fetch_daily(
        &self,
        symbol: &str,
        since: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, AppError> {
        let period1 = Utc
            .from_utc_datetime(&since.and_time(NaiveTime::MIN))
            .timestamp();
        let period2 = Utc::now().timestamp();
        let body = self.fetch_chart(
            symbol,
            &[
                ("period1", &period1.to_string()),
                ("period2", &period2.to_string()),
                ("interval", "1d"),
            ],
        )?;
        let (timestamps, closes) = extract_series(symbol, body)?;

        let mut out = Vec::with_capacity(timestamps.len());
        for (ts, close) in timestamps.into_iter().zip(closes) {
            let Some(close) = valid_close(close) else {
                continue;
            };
            // Daily bars are stamped at the session open; the US trading
            // date is what keys the levels log.
            let date = trading_date(utc_timestamp(symbol, ts)?);
            out.push((date, close));
        }
        std::thread::sleep(INTER_REQUEST_DELAY);
        Ok(out)
    }

    fn fetch_chart(&self, symbol: &str, query: &[(&str, &str)]) -> Result<ChartResponse, AppError> {
        let url = format!("{BASE_URL}/{symbol}");
        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| AppError::fetch(format!("Price request for {symbol} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::fetch(format!(
                "Price request for {symbol} failed with status {}.",
                resp.status()
            )));
        }

        resp.json()
            .map_err(|e| AppError::fetch(format!("Failed to parse chart response for {symbol}: {e}")))
    }
}

fn valid_close(close: Option<f64>) -> Option<f64> {
    close.filter(|c| c.is_finite() && *c > 0.0)
}

fn utc_timestamp(symbol: &str, ts: i64) -> Result<DateTime<Utc>, AppError> {
    Utc.timestamp_opt(ts, 0)
        .single()
        .ok_or_else(|| AppError::data(format!("Invalid bar timestamp {ts} for {symbol}.")))
}

/// Pull the timestamp/close vectors out of a chart response, validating the
/// envelope along the way.
fn extract_series(
    symbol: &str,
    body: ChartResponse,
) -> Result<(Vec<i64>, Vec<Option<f64>>), AppError> {
    if let Some(err) = body.chart.error {
        return Err(AppError::fetch(format!(
            "Provider error for {symbol}: {} ({}).",
            err.description, err.code
        )));
    }
    let result = body
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .ok_or_else(|| AppError::data(format!("Empty chart result for {symbol}.")))?;

    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    if timestamps.is_empty() || timestamps.len() != closes.len() {
        return Err(AppError::data(format!(
            "Malformed chart series for {symbol}: {} timestamps vs {} closes.",
            timestamps.len(),
            closes.len()
        )));
    }

    Ok((timestamps, closes))
}

// Wire format (subset of the v8 chart payload we actually consume).

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    close: Vec<Option<f64>>,
}
