//! History ledger: one `YYYY-MM-DD HH:MM;<value>` record per line, oldest first.
//!
//! The ledger is only ever rewritten wholesale. Readings are appended in
//! memory with [`append_if_newer`] and the whole sequence is written back
//! with [`write_ledger`].

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::OnceLock;

use chrono::{NaiveDateTime, TimeDelta};
use regex::Regex;
use tracing::{debug, error, info};

use crate::contract::{TimedMeasurement, TIME_LAYOUT};
use crate::error::PegelError;

/// Number of deltas kept in a trend.
pub const MAX_TREND: usize = 5;

fn ledger_line() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4}-\d\d-\d\d \d\d:\d\d);(-?\d+)$").expect("static ledger pattern")
    })
}

fn parse_ledger_line(line: &str) -> Result<TimedMeasurement, PegelError> {
    let caps = ledger_line()
        .captures(line)
        .ok_or_else(|| PegelError::parse(line, "expected 'YYYY-MM-DD HH:MM;<value>'"))?;
    let timestamp = NaiveDateTime::parse_from_str(&caps[1], TIME_LAYOUT)
        .map_err(|e| PegelError::parse(line, format!("invalid date: {e}")))?;
    let value = caps[2]
        .parse::<i64>()
        .map_err(|e| PegelError::parse(line, format!("invalid value: {e}")))?;
    Ok(TimedMeasurement::new(timestamp, value))
}

/// Read the ledger at `path`. A missing file is an empty ledger.
///
/// Any malformed non-empty line aborts the whole read.
pub fn read_ledger(path: &Path) -> Result<Vec<TimedMeasurement>, PegelError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "No history ledger yet, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => {
            error!(error = ?e, path = %path.display(), "Failed to read history ledger");
            return Err(PegelError::storage(path, e));
        }
    };

    let entries = content
        .lines()
        .filter(|line| !line.is_empty())
        .map(parse_ledger_line)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            error!(error = %e, path = %path.display(), "Malformed history ledger");
            e
        })?;

    debug!(path = %path.display(), entries = entries.len(), "Read history ledger");
    Ok(entries)
}

/// Overwrite the ledger at `path` with `entries`, creating parent directories.
pub fn write_ledger(path: &Path, entries: &[TimedMeasurement]) -> Result<(), PegelError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            error!(error = ?e, path = %parent.display(), "Failed to create data dir");
            PegelError::storage(parent, e)
        })?;
    }

    let body: String = entries
        .iter()
        .map(|m| format!("{};{}\n", m.timestamp.format(TIME_LAYOUT), m.value))
        .collect();

    fs::write(path, body).map_err(|e| {
        error!(error = ?e, path = %path.display(), "Failed to write history ledger");
        PegelError::storage(path, e)
    })?;
    debug!(path = %path.display(), entries = entries.len(), "Wrote history ledger");
    Ok(())
}

/// Append `candidate` if it is strictly later than the last entry.
///
/// Returns whether the ledger grew.
pub fn append_if_newer(ledger: &mut Vec<TimedMeasurement>, candidate: TimedMeasurement) -> bool {
    match ledger.last() {
        Some(last) if candidate.timestamp <= last.timestamp => false,
        _ => {
            ledger.push(candidate);
            true
        }
    }
}

/// Deltas between consecutive entries, most recent first, at most [`MAX_TREND`].
pub fn compute_trend(ledger: &[TimedMeasurement]) -> Vec<i64> {
    ledger
        .windows(2)
        .rev()
        .take(MAX_TREND)
        .map(|pair| pair[1].value - pair[0].value)
        .collect()
}

/// Entries with `end - span < timestamp <= end`, in ledger order.
pub fn recent_window(
    ledger: &[TimedMeasurement],
    end: NaiveDateTime,
    span: TimeDelta,
) -> Vec<TimedMeasurement> {
    let start = end - span;
    ledger
        .iter()
        .filter(|m| m.timestamp > start && m.timestamp <= end)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(ts: &str, value: i64) -> TimedMeasurement {
        TimedMeasurement::new(NaiveDateTime::parse_from_str(ts, TIME_LAYOUT).unwrap(), value)
    }

    #[test]
    fn write_then_read_yields_the_same_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("history");

        write_ledger(&path, &[]).unwrap();
        assert_eq!(read_ledger(&path).unwrap(), Vec::new());

        let ledger = vec![
            m("2024-01-01 00:00", 90),
            m("2024-01-01 06:00", 0),
            m("2024-01-01 12:00", -4),
            m("2024-12-31 23:45", 145),
        ];
        write_ledger(&path, &ledger).unwrap();
        assert_eq!(read_ledger(&path).unwrap(), ledger);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "2024-01-01 00:00;90\n2024-01-01 06:00;0\n2024-01-01 12:00;-4\n2024-12-31 23:45;145\n"
        );
    }

    #[test]
    fn missing_ledger_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_ledger(&dir.path().join("history")).unwrap().is_empty());
    }

    #[test]
    fn malformed_line_aborts_the_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");
        fs::write(&path, "2024-01-01 00:00;90\n\n2024-01-01 06:00;9x\n").unwrap();
        let err = read_ledger(&path).unwrap_err();
        assert!(matches!(err, PegelError::Parse { ref line, .. } if line == "2024-01-01 06:00;9x"));
    }

    #[test]
    fn append_only_when_strictly_later() {
        let mut ledger = vec![m("2024-01-01 06:00", 95)];

        assert!(!append_if_newer(&mut ledger, m("2024-01-01 06:00", 99)));
        assert!(!append_if_newer(&mut ledger, m("2024-01-01 05:45", 99)));
        assert_eq!(ledger, vec![m("2024-01-01 06:00", 95)]);

        assert!(append_if_newer(&mut ledger, m("2024-01-01 06:15", 97)));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn append_to_empty_ledger() {
        let mut ledger = Vec::new();
        assert!(append_if_newer(&mut ledger, m("2024-01-01 00:00", 90)));
        assert_eq!(ledger, vec![m("2024-01-01 00:00", 90)]);
    }

    #[test]
    fn trend_is_most_recent_first_and_bounded() {
        assert!(compute_trend(&[]).is_empty());
        assert!(compute_trend(&[m("2024-01-01 00:00", 90)]).is_empty());

        let ledger: Vec<_> = [90, 95, 92, 92, 100, 110, 105]
            .iter()
            .enumerate()
            .map(|(i, v)| m(&format!("2024-01-01 {:02}:00", i), *v))
            .collect();
        assert_eq!(compute_trend(&ledger), vec![-5, 10, 8, 0, -3]);
        assert_eq!(compute_trend(&ledger[..3]), vec![-3, 5]);
    }

    #[test]
    fn recent_window_excludes_the_lower_bound() {
        let ledger = vec![
            m("2024-01-01 12:00", 1),
            m("2024-01-01 12:15", 2),
            m("2024-01-08 12:00", 3),
        ];
        let end = ledger[2].timestamp;
        let window = recent_window(&ledger, end, TimeDelta::days(7));
        assert_eq!(window, vec![m("2024-01-01 12:15", 2), m("2024-01-08 12:00", 3)]);
    }
}
