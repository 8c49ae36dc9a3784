//! Tidal state classification from water depth
//!
//! Flow direction comes from the first difference of the outside depth,
//! scaled to metres per hour. Near-zero change splits into high and low
//! slack around the dataset median. Phase maps each depth onto a 0..1
//! low-to-low cycle position under a sinusoidal tide model.

use chrono::NaiveDateTime;
use log::info;
use serde::{Deserialize, Serialize};

use crate::core::binning::{self, CategoryColumn};
use crate::core::fusion::FusedTable;
use crate::core::series::stats;

/// Flow state labels, in reporting order
pub const FLOW_LABELS: [&str; 4] = ["Rising", "Falling", "High Slack", "Low Slack"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TidalConfig {
    /// Depth change in metres per hour below which water counts as slack
    pub slack_threshold: f64,
    /// Sampling periods per hour, scales the depth difference
    pub periods_per_hour: f64,
    /// Rolling-mean window for landmark smoothing, in samples
    pub smoothing_window: usize,
    /// Minimum samples between two detected tide extremes
    pub landmark_min_distance: usize,
    /// Number of equal-width phase buckets
    pub phase_bins: usize,
}

impl Default for TidalConfig {
    fn default() -> Self {
        Self {
            slack_threshold: 0.05,
            periods_per_hour: 2.0,
            smoothing_window: 25,
            landmark_min_distance: 20,
            phase_bins: 12,
        }
    }
}

/// Classify each row's tidal flow state.
///
/// The change rate compares a row's depth with the depth at the previous
/// distinct timestamp, so repeated detection rows never read as slack.
/// Rows missing either depth stay unknown.
pub fn flow_column(table: &FusedTable, config: &TidalConfig) -> CategoryColumn {
    let labels: Vec<String> = FLOW_LABELS.iter().map(|l| l.to_string()).collect();
    let rows = table.rows();

    let mut known: Vec<f64> = rows.iter().filter_map(|r| r.depth).collect();
    let median_depth = stats::median(&mut known);

    let mut assignments = Vec::with_capacity(rows.len());
    let mut prev: Option<(NaiveDateTime, Option<f64>)> = None;
    let mut cur: Option<(NaiveDateTime, Option<f64>)> = None;
    for row in rows {
        if cur.map(|(t, _)| t) != Some(row.timestamp) {
            prev = cur;
            cur = Some((row.timestamp, row.depth));
        }
        let state = match (prev.and_then(|(_, d)| d), row.depth) {
            (Some(before), Some(depth)) => {
                let change = (depth - before) * config.periods_per_hour;
                if change > config.slack_threshold {
                    Some(0)
                } else if change < -config.slack_threshold {
                    Some(1)
                } else if depth >= median_depth {
                    Some(2)
                } else {
                    Some(3)
                }
            }
            _ => None,
        };
        assignments.push(state);
    }

    CategoryColumn::new("tidal_flow", labels, assignments)
}

/// High and low tide extreme positions over the fused timeline
#[derive(Debug, Clone, Default)]
pub struct TideLandmarks {
    pub high_tides: Vec<usize>,
    pub low_tides: Vec<usize>,
}

/// Locate tide extremes on a smoothed copy of the depth series.
///
/// Positions where the smoothing window cannot fill are treated as zero
/// depth, matching the rest of the landmark bookkeeping.
pub fn tide_landmarks(table: &FusedTable, config: &TidalConfig) -> TideLandmarks {
    let smoothed: Vec<f64> = stats::rolling_mean_centered(&table.depths(), config.smoothing_window)
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();
    let negated: Vec<f64> = smoothed.iter().map(|v| -v).collect();

    let landmarks = TideLandmarks {
        high_tides: stats::find_peaks(&smoothed, config.landmark_min_distance),
        low_tides: stats::find_peaks(&negated, config.landmark_min_distance),
    };
    info!(
        "identified {} high tides and {} low tides",
        landmarks.high_tides.len(),
        landmarks.low_tides.len()
    );
    landmarks
}

/// Continuous tidal phase per row: 0 is low tide, 0.5 high, 1 the next low.
///
/// Phase is the arcsine of the min-max normalized depth, which assumes a
/// roughly sinusoidal tide curve. A flat or empty depth series has no
/// usable normalization and yields no phases.
pub fn phase_values(table: &FusedTable) -> Vec<Option<f64>> {
    let depths = table.depths();
    let known: Vec<f64> = depths.iter().filter_map(|d| *d).collect();

    let Some((min, max)) = stats::min_max(&known) else {
        return vec![None; depths.len()];
    };
    let range = max - min;
    if range <= 0.0 {
        return vec![None; depths.len()];
    }

    depths
        .iter()
        .map(|d| {
            d.map(|depth| {
                let normalized = ((depth - min) / range).clamp(0.0, 1.0);
                (2.0 * normalized - 1.0).asin() / std::f64::consts::PI + 0.5
            })
        })
        .collect()
}

/// Bucket tidal phase into equal-width bins over the 0..1 cycle
pub fn phase_column(table: &FusedTable, config: &TidalConfig) -> CategoryColumn {
    let phases = phase_values(table);
    binning::equal_range_bins("tidal_phase", &phases, config.phase_bins, 0.0, 1.0)
}
