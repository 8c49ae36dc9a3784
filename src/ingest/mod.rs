//! CSV loaders for the two input sheets

pub mod camera;
pub mod sensor;

use anyhow::{bail, Result};
use chrono::NaiveDateTime;

use crate::config::ColumnMap;

/// Timestamp formats seen across camera and logger deployments
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%y %H:%M",
];

/// Parse a field-log timestamp in any deployment format
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
}

/// Lenient numeric cell parsing; blanks and junk become missing values
pub(crate) fn parse_number(cell: Option<&str>) -> Option<f64> {
    let trimmed = cell?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Where a sheet keeps its timestamp: one combined column, or a date and
/// time pair joined at parse time
#[derive(Debug, Clone, Copy)]
pub(crate) enum TimestampSource {
    Single(usize),
    Split { date: usize, time: usize },
}

impl TimestampSource {
    pub(crate) fn locate(headers: &[String], columns: &ColumnMap) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        if let Some(index) = find(&columns.timestamp) {
            return Ok(Self::Single(index));
        }
        match (find(&columns.date), find(&columns.time)) {
            (Some(date), Some(time)) => Ok(Self::Split { date, time }),
            _ => bail!(
                "no '{}' column and no '{}' + '{}' pair in header",
                columns.timestamp,
                columns.date,
                columns.time
            ),
        }
    }

    pub(crate) fn extract(&self, record: &csv::StringRecord) -> Option<NaiveDateTime> {
        match *self {
            Self::Single(index) => parse_timestamp(record.get(index)?),
            Self::Split { date, time } => {
                let combined = format!("{} {}", record.get(date)?.trim(), record.get(time)?.trim());
                parse_timestamp(&combined)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_formats() {
        for raw in [
            "2024-03-01 06:30:00",
            "2024-03-01 06:30",
            "03/01/2024 06:30",
            "03/01/2024 6:30:00 AM",
        ] {
            let parsed = parse_timestamp(raw);
            assert!(parsed.is_some(), "failed to parse {:?}", raw);
            assert_eq!(
                parsed.unwrap().to_string(),
                "2024-03-01 06:30:00",
                "wrong value for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_parse_timestamp_rejects_junk() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("2024-13-40 99:99"), None);
    }

    #[test]
    fn test_parse_number_leniency() {
        assert_eq!(parse_number(Some(" 1.5 ")), Some(1.5));
        assert_eq!(parse_number(Some("")), None);
        assert_eq!(parse_number(Some("n/a")), None);
        assert_eq!(parse_number(None), None);
    }

    #[test]
    fn test_timestamp_source_prefers_combined_column() {
        let headers: Vec<String> = ["Date", "Time", "DateTime"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        let source = TimestampSource::locate(&headers, &ColumnMap::default()).unwrap();
        assert!(matches!(source, TimestampSource::Single(2)));
    }

    #[test]
    fn test_timestamp_source_falls_back_to_split() {
        let headers: Vec<String> = ["Date", "Time", "Species 1"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        let source = TimestampSource::locate(&headers, &ColumnMap::default()).unwrap();
        assert!(matches!(source, TimestampSource::Split { date: 0, time: 1 }));
    }

    #[test]
    fn test_timestamp_source_missing_is_an_error() {
        let headers: Vec<String> = vec!["Species 1".to_string()];
        assert!(TimestampSource::locate(&headers, &ColumnMap::default()).is_err());
    }
}
