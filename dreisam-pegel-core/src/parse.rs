use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, error};

use crate::contract::TimedMeasurement;
use crate::error::PegelError;

/// `['<id>','<place>','<river>',<n>,'<value>','cm','DD.MM.YYYY HH:MM <TZ>',`
fn record_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^\s*\['[^']*','[^']*','[^']*',\d+,'(\d+)','cm','(\d\d)\.(\d\d)\.(\d{4}) (\d\d):(\d\d) [A-Z]+',",
        )
        .expect("static record pattern")
    })
}

/// First line of `feed` that starts with `prefix`, leading whitespace ignored.
pub fn find_station_line<'a>(feed: &'a str, prefix: &str) -> Option<&'a str> {
    let prefix = prefix.trim_start();
    feed.lines().find(|line| line.trim_start().starts_with(prefix))
}

/// Extract the reading from a single station record line.
pub fn parse_record(line: &str) -> Result<TimedMeasurement, PegelError> {
    let caps = record_pattern()
        .captures(line)
        .ok_or_else(|| PegelError::parse(line, "does not match the station record layout"))?;

    let field = |idx: usize, name: &str| -> Result<u32, PegelError> {
        caps[idx]
            .parse::<u32>()
            .map_err(|e| PegelError::parse(line, format!("invalid {name} '{}': {e}", &caps[idx])))
    };

    let value = caps[1]
        .parse::<i64>()
        .map_err(|e| PegelError::parse(line, format!("invalid pegel '{}': {e}", &caps[1])))?;
    let day = field(2, "day")?;
    let month = field(3, "month")?;
    let year = field(4, "year")?;
    let hour = field(5, "hour")?;
    let minute = field(6, "minute")?;

    let timestamp = NaiveDate::from_ymd_opt(year as i32, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .ok_or_else(|| {
            PegelError::parse(
                line,
                format!("invalid timestamp {day:02}.{month:02}.{year} {hour:02}:{minute:02}"),
            )
        })?;

    Ok(TimedMeasurement::new(timestamp, value))
}

/// Locate the station in the raw feed and parse its record.
pub fn parse_station(feed: &[u8], prefix: &str) -> Result<TimedMeasurement, PegelError> {
    let text = String::from_utf8_lossy(feed);
    let Some(line) = find_station_line(&text, prefix) else {
        error!(prefix, "Station not found in gauge feed");
        return Err(PegelError::StationNotFound {
            prefix: prefix.to_string(),
        });
    };

    let reading = parse_record(line).map_err(|e| {
        error!(error = %e, "Failed to parse station record");
        e
    })?;
    debug!(timestamp = %reading.timestamp, value = reading.value, "Parsed station record");
    Ok(reading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    const LINE: &str = " ['00389','Ebnet','Dreisam',3,'92','cm','01.01.2024 12:00 MEZ','2.31','m3/s','01.01.2024 12:00 MEZ'],";

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn parses_value_and_timestamp() {
        let reading = parse_record(LINE).unwrap();
        assert_eq!(reading.value, 92);
        assert_eq!(reading.timestamp, ts("2024-01-01 12:00"));
    }

    #[test]
    fn rejects_impossible_dates() {
        let line = LINE.replace("01.01.2024", "31.02.2024");
        assert!(matches!(parse_record(&line), Err(PegelError::Parse { .. })));
    }

    #[test]
    fn rejects_non_numeric_value() {
        let line = LINE.replace("'92'", "'n/a'");
        let err = parse_record(&line).unwrap_err();
        match err {
            PegelError::Parse { line: offending, .. } => assert!(offending.contains("n/a")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn finds_station_among_other_lines() {
        let feed = format!(
            "var hvz = [\n ['00388','Foo','Bar',1,'10','cm','01.01.2024 12:00 MEZ',\n{LINE}\n];\n"
        );
        let reading = parse_station(feed.as_bytes(), "['00389',").unwrap();
        assert_eq!(reading.value, 92);
    }

    #[test]
    fn missing_station_is_reported() {
        let err = parse_station(b"var hvz = [];\n", "['00389',").unwrap_err();
        assert!(matches!(err, PegelError::StationNotFound { .. }));
    }
}
