//! Detection rate aggregation under two denominators
//!
//! Every summary carries the denominator definition it was computed with,
//! so a camera activity rate can never be read as a detection success rate.

use serde::Serialize;

use crate::core::binning::CategoryColumn;
use crate::core::fusion::{FusedRow, FusedTable};

/// Which rows form the denominator and what counts as a positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RateMode {
    /// Every fused row counts; a positive is a camera-active row
    AllPeriods,
    /// Only camera-active rows count; a positive is an animal detection
    ActiveOnly,
}

impl RateMode {
    /// Short human name for logs and headings
    pub fn describes(&self) -> &'static str {
        match self {
            RateMode::AllPeriods => "camera activity",
            RateMode::ActiveOnly => "detection success",
        }
    }

    pub(crate) fn admits(&self, row: &FusedRow) -> bool {
        match self {
            RateMode::AllPeriods => true,
            RateMode::ActiveOnly => row.camera_active,
        }
    }

    pub(crate) fn is_positive(&self, row: &FusedRow) -> bool {
        match self {
            RateMode::AllPeriods => row.camera_active,
            RateMode::ActiveOnly => row.animal_detected,
        }
    }
}

/// Rate for one combination of category labels
#[derive(Debug, Clone, Serialize)]
pub struct RateRow {
    pub key: Vec<String>,
    pub total: u64,
    pub positives: u64,
    pub rate: f64,
}

impl RateRow {
    pub fn rate_pct(&self) -> f64 {
        self.rate * 100.0
    }
}

/// Grouped rates over one or more categorical dimensions
#[derive(Debug, Clone, Serialize)]
pub struct RateSummary {
    pub mode: RateMode,
    pub dimensions: Vec<String>,
    pub rows: Vec<RateRow>,
}

fn unravel(mut cell: usize, shape: &[usize]) -> Vec<usize> {
    let mut indices = vec![0; shape.len()];
    for k in (0..shape.len()).rev() {
        indices[k] = cell % shape[k];
        cell /= shape[k];
    }
    indices
}

/// Group rows by the given category columns and compute the rate per group.
///
/// Rows with any unknown category are excluded before counting. Groups come
/// out in the ordinal label order of the dimensions, first dimension
/// outermost; combinations that never occur are omitted.
pub fn aggregate(table: &FusedTable, dimensions: &[&CategoryColumn], mode: RateMode) -> RateSummary {
    let shape: Vec<usize> = dimensions.iter().map(|d| d.labels.len()).collect();
    let cells: usize = if shape.contains(&0) {
        0
    } else {
        shape.iter().product()
    };

    let mut totals = vec![0u64; cells];
    let mut positives = vec![0u64; cells];
    'rows: for (i, row) in table.rows().iter().enumerate() {
        if !mode.admits(row) {
            continue;
        }
        let mut cell = 0usize;
        for (dim, len) in dimensions.iter().zip(&shape) {
            match dim.assignments.get(i).copied().flatten() {
                Some(j) => cell = cell * len + j,
                None => continue 'rows,
            }
        }
        totals[cell] += 1;
        if mode.is_positive(row) {
            positives[cell] += 1;
        }
    }

    let mut rows = Vec::new();
    for cell in 0..cells {
        if totals[cell] == 0 {
            continue;
        }
        let key = unravel(cell, &shape)
            .iter()
            .zip(dimensions)
            .map(|(&j, dim)| dim.labels[j].clone())
            .collect();
        rows.push(RateRow {
            key,
            total: totals[cell],
            positives: positives[cell],
            rate: positives[cell] as f64 / totals[cell] as f64,
        });
    }

    RateSummary {
        mode,
        dimensions: dimensions.iter().map(|d| d.name.clone()).collect(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fusion::FusedRow;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(6, minute, 0)
            .unwrap()
    }

    fn row(minute: u32, camera_active: bool, animal_detected: bool) -> FusedRow {
        FusedRow {
            timestamp: ts(minute),
            depth: None,
            depth_inside: None,
            gate_primary_deg: None,
            gate_secondary_deg: None,
            air_temp_c: None,
            wind_speed_kmh: None,
            species: animal_detected.then(|| "Ardea alba".to_string()),
            count: u32::from(animal_detected),
            note: String::new(),
            camera_active,
            animal_detected,
        }
    }

    fn column(labels: &[&str], assignments: Vec<Option<usize>>) -> CategoryColumn {
        CategoryColumn::new(
            "state",
            labels.iter().map(|l| l.to_string()).collect(),
            assignments,
        )
    }

    #[test]
    fn test_denominators_are_distinct() {
        // 4 rows in one bucket: 2 camera-active, 1 with a detection
        let table = FusedTable::from_rows(vec![
            row(0, false, false),
            row(1, false, false),
            row(2, true, false),
            row(3, true, true),
        ]);
        let states = column(&["A"], vec![Some(0); 4]);

        let all = aggregate(&table, &[&states], RateMode::AllPeriods);
        assert_eq!(all.rows[0].total, 4);
        assert_eq!(all.rows[0].positives, 2);
        assert!((all.rows[0].rate - 0.5).abs() < 1e-9);

        let active = aggregate(&table, &[&states], RateMode::ActiveOnly);
        assert_eq!(active.rows[0].total, 2);
        assert_eq!(active.rows[0].positives, 1);
        assert!((active.rows[0].rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_rows_never_enter_a_denominator() {
        let table = FusedTable::from_rows(vec![row(0, true, true), row(1, true, false)]);
        let states = column(&["A"], vec![Some(0), None]);

        let summary = aggregate(&table, &[&states], RateMode::AllPeriods);
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.rows[0].total, 1);
    }

    #[test]
    fn test_groups_follow_label_order_not_alphabetical() {
        let table = FusedTable::from_rows(vec![row(0, true, false), row(1, false, false)]);
        // "Zebra" is ordinally first
        let states = column(&["Zebra", "Apple"], vec![Some(1), Some(0)]);

        let summary = aggregate(&table, &[&states], RateMode::AllPeriods);
        assert_eq!(summary.rows[0].key, vec!["Zebra".to_string()]);
        assert_eq!(summary.rows[1].key, vec!["Apple".to_string()]);
    }

    #[test]
    fn test_empty_groups_are_omitted() {
        let table = FusedTable::from_rows(vec![row(0, true, false)]);
        let states = column(&["A", "B", "C"], vec![Some(2)]);

        let summary = aggregate(&table, &[&states], RateMode::AllPeriods);
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.rows[0].key, vec!["C".to_string()]);
    }

    #[test]
    fn test_two_dimensional_grouping() {
        let table = FusedTable::from_rows(vec![
            row(0, true, true),
            row(1, true, false),
            row(2, true, false),
        ]);
        let gate = column(&["Closed", "Open"], vec![Some(1), Some(1), Some(0)]);
        let flow = CategoryColumn::new(
            "flow",
            vec!["Rising".to_string(), "Falling".to_string()],
            vec![Some(0), Some(0), Some(1)],
        );

        let summary = aggregate(&table, &[&gate, &flow], RateMode::ActiveOnly);
        assert_eq!(summary.dimensions, vec!["state".to_string(), "flow".to_string()]);
        assert_eq!(summary.rows.len(), 2);
        // (Closed, Falling) then (Open, Rising) in ordinal order
        assert_eq!(summary.rows[0].key, vec!["Closed".to_string(), "Falling".to_string()]);
        assert_eq!(summary.rows[1].key, vec!["Open".to_string(), "Rising".to_string()]);
        assert!((summary.rows[1].rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_active_only_skips_idle_rows() {
        let table = FusedTable::from_rows(vec![row(0, false, false), row(1, false, false)]);
        let states = column(&["A"], vec![Some(0), Some(0)]);

        let summary = aggregate(&table, &[&states], RateMode::ActiveOnly);
        assert!(summary.rows.is_empty());
    }
}
