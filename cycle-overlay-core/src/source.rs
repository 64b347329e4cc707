//! User roster and per-user source records.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CycleOverlayError, CycleOverlayResult};
use crate::timeline::parse_date;

/// One usable row of the `users.csv` roster.
#[derive(Debug, Clone)]
pub struct RosterRow {
    pub token: String,
    pub label: String,
    pub start_date: String,
    pub cycle_length: Option<i64>,
}

/// Raw CSV shape; the roster is hand-edited, so every column is optional
/// and cleaned up before use.
#[derive(Debug, Deserialize)]
struct RawRosterRow {
    #[serde(default)]
    token: String,
    #[serde(default, rename = "startDate")]
    start_date: String,
    #[serde(default)]
    label: String,
    #[serde(default, rename = "cycleLength")]
    cycle_length: String,
}

/// Load the roster; a missing file means no users (legacy mode).
///
/// Rows without a token or start date are skipped. A label defaults to
/// the token; a non-numeric cycle length is treated as unset.
pub fn load_roster(path: &Path) -> CycleOverlayResult<Vec<RosterRow>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader =
        csv::Reader::from_path(path).map_err(|e| CycleOverlayError::Roster(e.to_string()))?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<RawRosterRow>() {
        let raw = result.map_err(|e| CycleOverlayError::Roster(e.to_string()))?;

        let token = raw.token.trim().to_string();
        let start_date = raw.start_date.trim().to_string();
        if token.is_empty() || start_date.is_empty() {
            continue;
        }

        let label = match raw.label.trim() {
            "" => token.clone(),
            trimmed => trimmed.to_string(),
        };
        let cycle_length = raw.cycle_length.trim().parse::<i64>().ok().filter(|n| *n > 0);

        rows.push(RosterRow {
            token,
            label,
            start_date,
            cycle_length,
        });
    }

    Ok(rows)
}

/// Per-user source of truth at `data/users/<token>.json`.
///
/// This is the only state that accumulates across runs; everything else
/// is derived fresh each time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceRecord {
    #[serde(default)]
    pub last_period_start: String,
    #[serde(default)]
    pub history: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_length: Option<i64>,
}

/// Read a source record, treating a missing file or malformed JSON as an
/// empty record. Non-string history entries are dropped.
pub fn read_source(path: &Path) -> SourceRecord {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return SourceRecord::default(),
    };

    match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(value) => record_from_value(&value),
        Err(_) => SourceRecord::default(),
    }
}

fn record_from_value(value: &serde_json::Value) -> SourceRecord {
    let last_period_start = value
        .get("last_period_start")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .trim()
        .to_string();

    let history = value
        .get("history")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let cycle_length = value.get("cycle_length").and_then(|v| v.as_i64());

    SourceRecord {
        last_period_start,
        history,
        cycle_length,
    }
}

/// Load the legacy single-user record. Its absence is fatal: the file is
/// the only source of truth for pre-roster sites.
pub fn load_legacy_source(path: &Path) -> CycleOverlayResult<SourceRecord> {
    if !path.exists() {
        return Err(CycleOverlayError::SourceMissing(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| CycleOverlayError::Serialization(e.to_string()))?;

    Ok(record_from_value(&value))
}

/// Drop unparseable entries, deduplicate, sort, and make sure the start
/// date itself is present.
pub fn normalize_history(history: &[String], start_date: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut values = Vec::new();

    for item in history {
        let value = item.trim();
        if value.is_empty() || parse_date(value).is_none() {
            continue;
        }
        if seen.insert(value.to_string()) {
            values.push(value.to_string());
        }
    }

    if !seen.contains(start_date) {
        values.push(start_date.to_string());
    }

    values.sort();
    values
}

/// Normalize the on-disk record for one user, creating or repairing it
/// from the roster defaults when needed, and rewrite it in place.
///
/// An existing start date and cycle length in the file win over the
/// roster values.
pub fn ensure_source(
    path: &Path,
    start_date: &str,
    cycle_length: Option<i64>,
) -> CycleOverlayResult<SourceRecord> {
    let existing = read_source(path);

    let start = if existing.last_period_start.is_empty() {
        start_date.to_string()
    } else {
        existing.last_period_start.clone()
    };

    let record = SourceRecord {
        history: normalize_history(&existing.history, &start),
        last_period_start: start,
        cycle_length: existing.cycle_length.or(cycle_length),
    };

    save_source(path, &record)?;
    Ok(record)
}

/// Write via tmp + rename so a crashed run never leaves a half-written
/// record behind.
fn save_source(path: &Path, record: &SourceRecord) -> CycleOverlayResult<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let content = serde_json::to_string_pretty(record)
        .map_err(|e| CycleOverlayError::Serialization(e.to_string()))?;

    let temp = path.with_extension("json.tmp");
    std::fs::write(&temp, content + "\n")?;
    std::fs::rename(&temp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_history_sorts_dedups_and_drops_invalid() {
        let history = strings(&[
            "2026-01-29",
            "garbage",
            "2026-01-01",
            "2026-01-29",
            "  ",
            "2025-12-04",
        ]);
        let normalized = normalize_history(&history, "2026-01-01");

        assert_eq!(
            normalized,
            strings(&["2025-12-04", "2026-01-01", "2026-01-29"])
        );
    }

    #[test]
    fn test_normalize_history_adds_missing_start() {
        let normalized = normalize_history(&strings(&["2025-12-04"]), "2026-01-01");
        assert_eq!(normalized, strings(&["2025-12-04", "2026-01-01"]));

        // Present exactly once even when already in history.
        let normalized = normalize_history(&strings(&["2026-01-01"]), "2026-01-01");
        assert_eq!(normalized, strings(&["2026-01-01"]));
    }

    #[test]
    fn test_ensure_source_creates_from_roster_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users").join("anna.json");

        let record = ensure_source(&path, "2026-01-01", Some(30)).unwrap();
        assert_eq!(record.last_period_start, "2026-01-01");
        assert_eq!(record.history, strings(&["2026-01-01"]));
        assert_eq!(record.cycle_length, Some(30));

        // And the file exists for the next run.
        let reread = read_source(&path);
        assert_eq!(reread.last_period_start, "2026-01-01");
        assert_eq!(reread.cycle_length, Some(30));
    }

    #[test]
    fn test_ensure_source_prefers_existing_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anna.json");
        std::fs::write(
            &path,
            r#"{"last_period_start": "2026-02-01", "history": ["2026-01-04", "bad"], "cycle_length": 26}"#,
        )
        .unwrap();

        let record = ensure_source(&path, "2026-01-01", Some(30)).unwrap();
        assert_eq!(record.last_period_start, "2026-02-01");
        assert_eq!(record.history, strings(&["2026-01-04", "2026-02-01"]));
        assert_eq!(record.cycle_length, Some(26));
    }

    #[test]
    fn test_read_source_treats_malformed_json_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let record = read_source(&path);
        assert_eq!(record.last_period_start, "");
        assert!(record.history.is_empty());
        assert_eq!(record.cycle_length, None);
    }

    #[test]
    fn test_load_legacy_source_missing_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_legacy_source(&dir.path().join("data.json"));
        assert!(matches!(result, Err(CycleOverlayError::SourceMissing(_))));
    }

    #[test]
    fn test_load_roster_skips_incomplete_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.csv");
        std::fs::write(
            &path,
            "token,startDate,label,cycleLength\n\
             anna,2026-01-01,Anna,30\n\
             ,2026-01-01,NoToken,\n\
             bela,,Bela,\n\
             cleo,2026-01-05,,abc\n",
        )
        .unwrap();

        let rows = load_roster(&path).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].token, "anna");
        assert_eq!(rows[0].label, "Anna");
        assert_eq!(rows[0].cycle_length, Some(30));

        // Label falls back to the token; "abc" is not a cycle length.
        assert_eq!(rows[1].token, "cleo");
        assert_eq!(rows[1].label, "cleo");
        assert_eq!(rows[1].cycle_length, None);
    }

    #[test]
    fn test_load_roster_missing_file_means_no_users() {
        let dir = tempfile::tempdir().unwrap();
        let rows = load_roster(&dir.path().join("users.csv")).unwrap();
        assert!(rows.is_empty());
    }
}
