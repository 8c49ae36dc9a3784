//! Categorical bucketing of continuous sensor fields

use serde::{Deserialize, Serialize};

use crate::core::series::stats;

/// Shared bucket names for both tide gates, from closed to wide open
pub const GATE_LABELS: [&str; 4] = ["Closed", "Partially Open", "Open", "Wide Open"];

/// Tide level tier names, from low to high
pub const TIDE_TIER_LABELS: [&str; 3] = ["Low Tide", "Mid Tide", "High Tide"];

/// An ordered set of labels with one assignment per fused row.
///
/// `None` marks a row whose value was missing or out of range; such rows
/// never enter a denominator downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryColumn {
    pub name: String,
    pub labels: Vec<String>,
    pub assignments: Vec<Option<usize>>,
}

impl CategoryColumn {
    pub fn new(name: impl Into<String>, labels: Vec<String>, assignments: Vec<Option<usize>>) -> Self {
        Self {
            name: name.into(),
            labels,
            assignments,
        }
    }

    /// Label text for a row, if the row is in a known state
    pub fn label_at(&self, row: usize) -> Option<&str> {
        let index = self.assignments.get(row).copied().flatten()?;
        self.labels.get(index).map(|s| s.as_str())
    }

    /// Number of rows in a known state
    pub fn known_rows(&self) -> usize {
        self.assignments.iter().filter(|a| a.is_some()).count()
    }
}

/// Fixed bucket boundaries with one label per interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinSpec {
    pub boundaries: Vec<f64>,
    pub labels: Vec<String>,
}

impl BinSpec {
    pub fn new(boundaries: &[f64], labels: &[&str]) -> Self {
        Self {
            boundaries: boundaries.to_vec(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    /// Check boundary monotonicity and label arity
    pub fn validate(&self) -> Result<(), String> {
        if self.boundaries.len() < 2 {
            return Err("needs at least two boundaries".to_string());
        }
        if self.labels.len() + 1 != self.boundaries.len() {
            return Err(format!(
                "{} labels cannot name {} intervals",
                self.labels.len(),
                self.boundaries.len() - 1
            ));
        }
        if !self.boundaries.windows(2).all(|w| w[0] < w[1]) {
            return Err("boundaries must be strictly increasing".to_string());
        }
        Ok(())
    }

    /// Bucket index for a value. Intervals are closed on the left, so a
    /// value on a shared boundary belongs to the higher bucket. Values
    /// outside the outer boundaries stay unassigned.
    pub fn assign(&self, value: f64) -> Option<usize> {
        if !value.is_finite() {
            return None;
        }
        self.boundaries
            .windows(2)
            .position(|w| value >= w[0] && value < w[1])
    }

    /// Apply to a sparse column of values
    pub fn column(&self, name: &str, values: &[Option<f64>]) -> CategoryColumn {
        let assignments = values.iter().map(|v| v.and_then(|x| self.assign(x))).collect();
        CategoryColumn::new(name, self.labels.clone(), assignments)
    }
}

/// Bucketing rules for the categorical report dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BinningConfig {
    /// Main gate angle buckets, degrees
    pub gate_primary: BinSpec,
    /// Top hinge gate angle buckets, degrees
    pub gate_secondary: BinSpec,
    /// Number of equal-width air temperature buckets
    pub temperature_bins: usize,
    /// Quantile separating low from mid tide
    pub tide_low_quantile: f64,
    /// Quantile separating mid from high tide
    pub tide_high_quantile: f64,
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            gate_primary: BinSpec::new(&[-1.0, 5.0, 39.0, 63.0, 88.0], &GATE_LABELS),
            gate_secondary: BinSpec::new(&[-2.0, 4.0, 20.0, 35.0, 42.0], &GATE_LABELS),
            temperature_bins: 5,
            tide_low_quantile: 0.25,
            tide_high_quantile: 0.75,
        }
    }
}

fn range_label(lo: f64, hi: f64) -> String {
    format!("{:.2}-{:.2}", lo, hi)
}

/// Quantile tiers over the observed value distribution.
///
/// Every known value lands in a tier; the quantiles are computed with
/// linear interpolation and each cut belongs to the tier above it.
pub fn quantile_tiers(name: &str, values: &[Option<f64>], low_q: f64, high_q: f64) -> CategoryColumn {
    let labels: Vec<String> = TIDE_TIER_LABELS.iter().map(|l| l.to_string()).collect();

    let mut known: Vec<f64> = values.iter().filter_map(|v| *v).collect();
    if known.is_empty() {
        return CategoryColumn::new(name, labels, vec![None; values.len()]);
    }
    known.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let low = stats::quantile_sorted(&known, low_q);
    let high = stats::quantile_sorted(&known, high_q);

    let assignments = values
        .iter()
        .map(|v| {
            v.map(|x| {
                if x < low {
                    0
                } else if x < high {
                    1
                } else {
                    2
                }
            })
        })
        .collect();
    CategoryColumn::new(name, labels, assignments)
}

/// Equal-width buckets over a fixed range. The top bucket keeps its upper
/// edge so the range maximum is never orphaned.
pub fn equal_range_bins(
    name: &str,
    values: &[Option<f64>],
    bins: usize,
    lo: f64,
    hi: f64,
) -> CategoryColumn {
    if bins == 0 || !(hi > lo) {
        return CategoryColumn::new(name, Vec::new(), vec![None; values.len()]);
    }

    let width = (hi - lo) / bins as f64;
    let labels = (0..bins)
        .map(|i| range_label(lo + i as f64 * width, lo + (i + 1) as f64 * width))
        .collect();

    let assignments = values
        .iter()
        .map(|v| {
            v.and_then(|x| {
                if !x.is_finite() || x < lo || x > hi {
                    return None;
                }
                let index = ((x - lo) / width).floor() as usize;
                Some(index.min(bins - 1))
            })
        })
        .collect();
    CategoryColumn::new(name, labels, assignments)
}

/// Equal-width buckets over the observed value range. A constant series
/// collapses to a single bucket holding every known value.
pub fn equal_width_bins(name: &str, values: &[Option<f64>], bins: usize) -> CategoryColumn {
    let known: Vec<f64> = values.iter().filter_map(|v| *v).collect();
    match stats::min_max(&known) {
        Some((lo, hi)) if hi > lo => equal_range_bins(name, values, bins, lo, hi),
        Some((lo, _)) => {
            let assignments = values.iter().map(|v| v.map(|_| 0)).collect();
            CategoryColumn::new(name, vec![range_label(lo, lo)], assignments)
        }
        None => CategoryColumn::new(name, Vec::new(), vec![None; values.len()]),
    }
}

/// Joint state of the two gates.
///
/// The more open gate drives the combined label, and a single known gate in
/// an open state is enough. Fully closed requires both gates known and
/// closed; anything else stays unknown. Relies on both inputs sharing the
/// closed-to-wide-open label order.
pub fn combined_gate(primary: &CategoryColumn, secondary: &CategoryColumn) -> CategoryColumn {
    let labels: Vec<String> = GATE_LABELS.iter().map(|l| l.to_string()).collect();
    let n = primary.assignments.len();

    let mut assignments = Vec::with_capacity(n);
    for i in 0..n {
        let a = primary.assignments[i];
        let b = secondary.assignments.get(i).copied().flatten();
        let state = match (a, b) {
            (Some(3), _) | (_, Some(3)) => Some(3),
            (Some(2), _) | (_, Some(2)) => Some(2),
            (Some(1), _) | (_, Some(1)) => Some(1),
            (Some(0), Some(0)) => Some(0),
            _ => None,
        };
        assignments.push(state);
    }
    CategoryColumn::new("combined_gate", labels, assignments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_spec_left_closed_right_open() {
        let spec = BinSpec::new(&[-1.0, 5.0, 39.0, 63.0, 88.0], &GATE_LABELS);

        assert_eq!(spec.assign(-1.0), Some(0));
        assert_eq!(spec.assign(4.9), Some(0));
        assert_eq!(spec.assign(5.0), Some(1));
        assert_eq!(spec.assign(63.0), Some(3));
        assert_eq!(spec.assign(88.0), None);
        assert_eq!(spec.assign(-1.5), None);
        assert_eq!(spec.assign(f64::NAN), None);
    }

    #[test]
    fn test_bin_spec_validation() {
        assert!(BinSpec::new(&[0.0, 1.0, 2.0], &["a", "b"]).validate().is_ok());
        assert!(BinSpec::new(&[0.0, 1.0], &["a", "b"]).validate().is_err());
        assert!(BinSpec::new(&[0.0, 0.0, 2.0], &["a", "b"]).validate().is_err());
        assert!(BinSpec::new(&[0.0], &[]).validate().is_err());
    }

    #[test]
    fn test_quantile_tiers_cover_all_known_values() {
        let values: Vec<Option<f64>> = (1..=8).map(|v| Some(v as f64)).collect();
        let tiers = quantile_tiers("tide_level", &values, 0.25, 0.75);

        assert_eq!(tiers.known_rows(), 8);
        // extremes land in the outer tiers
        assert_eq!(tiers.label_at(0), Some("Low Tide"));
        assert_eq!(tiers.label_at(7), Some("High Tide"));
        assert_eq!(tiers.label_at(3), Some("Mid Tide"));
    }

    #[test]
    fn test_quantile_tiers_ignore_missing() {
        let values = vec![Some(1.0), None, Some(2.0), Some(3.0)];
        let tiers = quantile_tiers("tide_level", &values, 0.25, 0.75);

        assert_eq!(tiers.assignments[1], None);
        assert_eq!(tiers.known_rows(), 3);
    }

    #[test]
    fn test_equal_range_bins_phase_labels() {
        let column = equal_range_bins("tidal_phase", &[Some(0.0), Some(0.5), Some(1.0)], 12, 0.0, 1.0);

        assert_eq!(column.labels.len(), 12);
        assert_eq!(column.labels[0], "0.00-0.08");
        assert_eq!(column.labels[11], "0.92-1.00");
        assert_eq!(column.label_at(0), Some("0.00-0.08"));
        // the exact upper edge stays inside the top bucket
        assert_eq!(column.label_at(2), Some("0.92-1.00"));
    }

    #[test]
    fn test_equal_width_bins_over_observed_range() {
        let values = vec![Some(0.0), Some(2.5), Some(10.0), None];
        let column = equal_width_bins("air_temp", &values, 5);

        assert_eq!(column.labels.len(), 5);
        assert_eq!(column.assignments[0], Some(0));
        assert_eq!(column.assignments[1], Some(1));
        assert_eq!(column.assignments[2], Some(4));
        assert_eq!(column.assignments[3], None);
    }

    #[test]
    fn test_equal_width_bins_constant_series() {
        let values = vec![Some(7.0), Some(7.0)];
        let column = equal_width_bins("air_temp", &values, 5);

        assert_eq!(column.labels.len(), 1);
        assert_eq!(column.assignments, vec![Some(0), Some(0)]);
    }

    #[test]
    fn test_combined_gate_takes_more_open_state() {
        let labels: Vec<String> = GATE_LABELS.iter().map(|l| l.to_string()).collect();
        let primary = CategoryColumn::new(
            "gate_primary",
            labels.clone(),
            vec![Some(0), Some(2), Some(0), None, None],
        );
        let secondary = CategoryColumn::new(
            "gate_secondary",
            labels,
            vec![Some(3), Some(1), Some(0), Some(1), None],
        );

        let combined = combined_gate(&primary, &secondary);
        assert_eq!(combined.assignments[0], Some(3));
        assert_eq!(combined.assignments[1], Some(2));
        assert_eq!(combined.assignments[2], Some(0));
        // one open gate is enough even when the other is unknown
        assert_eq!(combined.assignments[3], Some(1));
        assert_eq!(combined.assignments[4], None);
    }

    #[test]
    fn test_combined_gate_closed_needs_both_known() {
        let labels: Vec<String> = GATE_LABELS.iter().map(|l| l.to_string()).collect();
        let primary = CategoryColumn::new("gate_primary", labels.clone(), vec![Some(0)]);
        let secondary = CategoryColumn::new("gate_secondary", labels, vec![None]);

        let combined = combined_gate(&primary, &secondary);
        assert_eq!(combined.assignments[0], None);
    }
}
