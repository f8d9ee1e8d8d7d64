//! The levels log: `qbit_5_levels.csv`.
//!
//! This is the only long-lived state of the pipeline and the authoritative
//! historical record the trailing-window charts are rendered from.
//!
//! Semantics: upsert-by-date. A re-run for a date already present replaces
//! that row (last-write-wins); rows stay in chronological order and a date
//! never appears twice.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use crate::domain::LevelPoint;
use crate::error::AppError;

/// Read the levels log. A missing file is an empty log, not an error.
pub fn read_levels(path: &Path) -> Result<Vec<LevelPoint>, AppError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path)
        .map_err(|e| AppError::write(format!("Failed to open levels log '{}': {e}", path.display())))?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut out = Vec::new();
    for record in reader.deserialize() {
        let point: LevelPoint = record.map_err(|e| {
            AppError::data(format!("Invalid row in levels log '{}': {e}", path.display()))
        })?;
        out.push(point);
    }
    Ok(out)
}

/// The last recorded level, or a `Data` error when the log does not exist
/// or is empty (the stats artifact needs a numeric `last_level`).
pub fn last_level(path: &Path) -> Result<f64, AppError> {
    read_levels(path)?
        .last()
        .map(|p| p.level)
        .ok_or_else(|| {
            AppError::data(format!(
                "Levels log '{}' is missing or empty; run `qbit5 charts` first.",
                path.display()
            ))
        })
}

/// Merge `updates` into the levels log and rewrite it in full.
///
/// Existing dates are replaced by the incoming level; new dates are
/// inserted in date order.
pub fn upsert_levels(path: &Path, updates: &[LevelPoint]) -> Result<(), AppError> {
    let mut merged: BTreeMap<_, _> = read_levels(path)?
        .into_iter()
        .map(|p| (p.date, p.level))
        .collect();
    for point in updates {
        merged.insert(point.date, point.level);
    }

    let file = File::create(path)
        .map_err(|e| AppError::write(format!("Failed to create levels log '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);
    for (date, level) in merged {
        writer
            .serialize(LevelPoint { date, level })
            .map_err(|e| AppError::write(format!("Failed to write levels row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::write(format!("Failed to flush levels log: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn temp_csv(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("qbit5_levels_{}_{name}.csv", std::process::id()));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn missing_log_reads_as_empty() {
        let path = temp_csv("missing");
        assert!(read_levels(&path).unwrap().is_empty());
        assert!(last_level(&path).is_err());
    }

    #[test]
    fn round_trips_rows_in_date_order() {
        let path = temp_csv("roundtrip");
        upsert_levels(
            &path,
            &[
                LevelPoint { date: day(3), level: 101.5 },
                LevelPoint { date: day(2), level: 100.0 },
            ],
        )
        .unwrap();

        let rows = read_levels(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, day(2));
        assert_eq!(rows[1].date, day(3));
        assert_eq!(last_level(&path).unwrap(), 101.5);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn upsert_replaces_an_existing_date_exactly_once() {
        let path = temp_csv("upsert");
        upsert_levels(
            &path,
            &[
                LevelPoint { date: day(2), level: 100.0 },
                LevelPoint { date: day(3), level: 101.0 },
                LevelPoint { date: day(4), level: 102.0 },
            ],
        )
        .unwrap();

        // Re-run for Jan 3 with a corrected level.
        upsert_levels(&path, &[LevelPoint { date: day(3), level: 99.0 }]).unwrap();

        let rows = read_levels(&path).unwrap();
        assert_eq!(rows.len(), 3, "row count must be unaffected by an upsert");
        assert_eq!(rows[1].date, day(3));
        assert_eq!(rows[1].level, 99.0);
        assert!(rows.windows(2).all(|w| w[0].date < w[1].date));

        let _ = std::fs::remove_file(&path);
    }
}
