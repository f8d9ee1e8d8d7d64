//! The intraday series artifact: `qbit_5_intraday.csv`.
//!
//! Columns: `timestamp_utc,pct_vs_open`. Overwritten in full each run.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::SecondsFormat;

use crate::domain::IntradayPoint;
use crate::error::AppError;

pub fn write_intraday_csv(path: &Path, series: &[IntradayPoint]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::write(format!("Failed to create intraday CSV '{}': {e}", path.display()))
    })?;

    writeln!(file, "timestamp_utc,pct_vs_open")
        .map_err(|e| AppError::write(format!("Failed to write intraday CSV header: {e}")))?;
    for point in series {
        writeln!(
            file,
            "{},{:.6}",
            point.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            point.pct_vs_open
        )
        .map_err(|e| AppError::write(format!("Failed to write intraday CSV row: {e}")))?;
    }
    Ok(())
}
