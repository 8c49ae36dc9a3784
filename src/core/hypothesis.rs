//! Pivoted rate tables, peak condition search, and chi-square screening

use log::info;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::core::binning::CategoryColumn;
use crate::core::fusion::FusedTable;
use crate::core::rates::RateMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HypothesisConfig {
    /// Minimum positive detections before the chi-square test runs
    pub min_detections: u64,
    /// Significance level for flagging a tested relationship
    pub significance_level: f64,
}

impl Default for HypothesisConfig {
    fn default() -> Self {
        Self {
            min_detections: 20,
            significance_level: 0.05,
        }
    }
}

/// One cell of a two-dimensional rate pivot
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PivotCell {
    pub total: u64,
    pub positives: u64,
    pub rate: f64,
}

/// Rates pivoted over two categorical dimensions. `cells` is indexed
/// `[row][column]`; a cell is `None` when the combination never occurred.
#[derive(Debug, Clone, Serialize)]
pub struct PivotTable {
    pub mode: RateMode,
    pub row_name: String,
    pub col_name: String,
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub cells: Vec<Vec<Option<PivotCell>>>,
}

/// The best-performing cell of a pivot
#[derive(Debug, Clone, Serialize)]
pub struct PeakCondition {
    pub row_label: String,
    pub col_label: String,
    pub rate: f64,
    pub positives: u64,
    pub total: u64,
}

impl PivotTable {
    /// Highest-rate cell, scanning rows outermost so the first encountered
    /// wins ties. `None` when no occupied cell has a positive rate.
    pub fn peak(&self) -> Option<PeakCondition> {
        let mut best: Option<(usize, usize, PivotCell)> = None;
        for (r, row) in self.cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if let Some(cell) = *cell {
                    let better = match best {
                        None => true,
                        Some((_, _, held)) => cell.rate > held.rate,
                    };
                    if better {
                        best = Some((r, c, cell));
                    }
                }
            }
        }

        let (r, c, cell) = best?;
        if cell.rate <= 0.0 {
            return None;
        }
        Some(PeakCondition {
            row_label: self.row_labels[r].clone(),
            col_label: self.col_labels[c].clone(),
            rate: cell.rate,
            positives: cell.positives,
            total: cell.total,
        })
    }
}

/// Cross two category columns into a rate pivot under the given mode.
///
/// Rows where either category is unknown are excluded.
pub fn pivot_rates(
    table: &FusedTable,
    rows: &CategoryColumn,
    cols: &CategoryColumn,
    mode: RateMode,
) -> PivotTable {
    let mut totals = vec![vec![0u64; cols.labels.len()]; rows.labels.len()];
    let mut positives = vec![vec![0u64; cols.labels.len()]; rows.labels.len()];

    for (i, row) in table.rows().iter().enumerate() {
        if !mode.admits(row) {
            continue;
        }
        let Some(r) = rows.assignments.get(i).copied().flatten() else {
            continue;
        };
        let Some(c) = cols.assignments.get(i).copied().flatten() else {
            continue;
        };
        totals[r][c] += 1;
        if mode.is_positive(row) {
            positives[r][c] += 1;
        }
    }

    let cells = totals
        .iter()
        .zip(&positives)
        .map(|(total_row, positive_row)| {
            total_row
                .iter()
                .zip(positive_row)
                .map(|(&total, &positive)| {
                    (total > 0).then(|| PivotCell {
                        total,
                        positives: positive,
                        rate: positive as f64 / total as f64,
                    })
                })
                .collect()
        })
        .collect();

    PivotTable {
        mode,
        row_name: rows.name.clone(),
        col_name: cols.name.clone(),
        row_labels: rows.labels.clone(),
        col_labels: cols.labels.clone(),
        cells,
    }
}

/// Result of one chi-square independence test
#[derive(Debug, Clone, Serialize)]
pub struct ChiSquareTest {
    pub statistic: f64,
    pub dof: usize,
    pub p_value: f64,
    pub significant: bool,
}

/// Outcome of testing detection against one categorical dimension
#[derive(Debug, Clone, Serialize)]
pub enum HypothesisOutcome {
    Tested(ChiSquareTest),
    /// Too few detections to say anything; reported, never an error
    InsufficientData { positives: u64, required: u64 },
}

/// Test whether the detection outcome is independent of a categorical state.
///
/// Builds the 2xK contingency table of detected against not detected over
/// the rows with a known state, keeping only states that actually occur.
/// Skips descriptively when fewer than the configured minimum detections
/// exist, or when fewer than two states were observed.
pub fn chi_square_independence(
    table: &FusedTable,
    category: &CategoryColumn,
    config: &HypothesisConfig,
) -> HypothesisOutcome {
    let k = category.labels.len();
    let mut detected = vec![0u64; k];
    let mut not_detected = vec![0u64; k];
    for (i, row) in table.rows().iter().enumerate() {
        let Some(j) = category.assignments.get(i).copied().flatten() else {
            continue;
        };
        if row.animal_detected {
            detected[j] += 1;
        } else {
            not_detected[j] += 1;
        }
    }

    let positives: u64 = detected.iter().sum();
    if positives < config.min_detections {
        return HypothesisOutcome::InsufficientData {
            positives,
            required: config.min_detections,
        };
    }

    let observed: Vec<(u64, u64)> = detected
        .into_iter()
        .zip(not_detected)
        .filter(|&(d, n)| d + n > 0)
        .collect();
    if observed.len() < 2 {
        return HypothesisOutcome::InsufficientData {
            positives,
            required: config.min_detections,
        };
    }

    let grand: u64 = observed.iter().map(|&(d, n)| d + n).sum();
    let row_detected = positives as f64;
    let row_not = (grand - positives) as f64;

    let mut statistic = 0.0;
    for &(d, n) in &observed {
        let col_total = (d + n) as f64;
        let expected_d = col_total * row_detected / grand as f64;
        let expected_n = col_total * row_not / grand as f64;
        if expected_d > 0.0 {
            statistic += (d as f64 - expected_d).powi(2) / expected_d;
        }
        if expected_n > 0.0 {
            statistic += (n as f64 - expected_n).powi(2) / expected_n;
        }
    }

    let dof = observed.len() - 1;
    let p_value = match ChiSquared::new(dof as f64) {
        Ok(dist) => 1.0 - dist.cdf(statistic),
        Err(_) => {
            return HypothesisOutcome::InsufficientData {
                positives,
                required: config.min_detections,
            }
        }
    };

    info!(
        "chi-square vs {}: statistic {:.3}, dof {}, p {:.4}",
        category.name, statistic, dof, p_value
    );
    HypothesisOutcome::Tested(ChiSquareTest {
        statistic,
        dof,
        p_value,
        significant: p_value < config.significance_level,
    })
}
