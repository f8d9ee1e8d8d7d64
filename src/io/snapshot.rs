//! Published intraday artifacts: stats JSON, post text, last-run marker.
//!
//! All three are full-file overwrites. They are only written after the
//! whole computation succeeded, so a failed run never leaves them partially
//! updated.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::StatsSnapshot;
use crate::error::AppError;

/// Write `qbit_5_stats.json`.
///
/// The schema is a stable contract with the static site: exactly the keys
/// `pct_intraday`, `updated_at`, `last_level`.
pub fn write_stats_json(path: &Path, stats: &StatsSnapshot) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::write(format!("Failed to create stats JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, stats)
        .map_err(|e| AppError::write(format!("Failed to write stats JSON: {e}")))?;
    Ok(())
}

/// Write the one-line post text verbatim.
pub fn write_post_text(path: &Path, line: &str) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::write(format!("Failed to create post text '{}': {e}", path.display())))?;
    writeln!(file, "{line}")
        .map_err(|e| AppError::write(format!("Failed to write post text: {e}")))?;
    Ok(())
}

/// Write `last_run.txt` with the timestamp of this successful run.
pub fn write_last_run(path: &Path, updated_at: &str) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::write(format!("Failed to create last-run marker '{}': {e}", path.display())))?;
    writeln!(file, "intraday snapshot OK @ {updated_at}")
        .map_err(|e| AppError::write(format!("Failed to write last-run marker: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("qbit5_snapshot_{}_{name}", std::process::id()));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn stats_json_has_exactly_the_contract_keys() {
        let path = temp_file("stats.json");
        write_stats_json(
            &path,
            &StatsSnapshot {
                pct_intraday: 1.23,
                updated_at: "2025/08/29 23:05".to_string(),
                last_level: 142.31,
            },
        )
        .unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(obj["pct_intraday"], 1.23);
        assert_eq!(obj["updated_at"], "2025/08/29 23:05");
        assert_eq!(obj["last_level"], 142.31);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn post_text_is_written_verbatim() {
        let path = temp_file("post.txt");
        write_post_text(&path, "QBIT-5 +0.00% (2025/08/29 23:05)").unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "QBIT-5 +0.00% (2025/08/29 23:05)\n");
        let _ = std::fs::remove_file(&path);
    }
}
