//! Species-level summaries over the fused timeline

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::binning::CategoryColumn;
use crate::core::fusion::FusedTable;

/// Aggregate of one species across the monitoring period
#[derive(Debug, Clone, Serialize)]
pub struct SpeciesSummary {
    pub species: String,
    /// Individuals counted across all events
    pub total_count: u64,
    /// Fused rows where this species appears
    pub detection_events: u64,
    /// Detection events per camera-active period
    pub detection_rate_pct: f64,
}

/// Per-species totals, ordered by individuals descending. Ties fall back
/// to name order so the ranking is stable.
pub fn species_summary(table: &FusedTable) -> Vec<SpeciesSummary> {
    let camera_rows = table.camera_active_rows();

    let mut by_species: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for row in table.rows() {
        if let Some(species) = row.species.as_deref() {
            let entry = by_species.entry(species).or_default();
            entry.0 += u64::from(row.count);
            entry.1 += 1;
        }
    }

    let mut summaries: Vec<SpeciesSummary> = by_species
        .into_iter()
        .map(|(species, (total_count, detection_events))| SpeciesSummary {
            species: species.to_string(),
            total_count,
            detection_events,
            detection_rate_pct: if camera_rows == 0 {
                0.0
            } else {
                detection_events as f64 / camera_rows as f64 * 100.0
            },
        })
        .collect();
    summaries.sort_by(|a, b| {
        b.total_count
            .cmp(&a.total_count)
            .then_with(|| a.species.cmp(&b.species))
    });
    summaries
}

/// Distribution of one species' detections across flow states
#[derive(Debug, Clone, Serialize)]
pub struct FlowPreference {
    pub species: String,
    /// Detections with a known flow state
    pub detections: u64,
    /// Percent of detections per flow label, aligned with `flow_labels`
    pub percentages: Vec<f64>,
}

/// Flow preference rows for the top species, plus the label order they
/// are aligned to
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlowPreferenceTable {
    pub flow_labels: Vec<String>,
    pub rows: Vec<FlowPreference>,
}

/// Tidal flow preferences for the most frequently detected species.
///
/// Only detections with a known flow state participate, both in the
/// ranking and in the percentages; each row sums to 100.
pub fn species_flow_preferences(
    table: &FusedTable,
    flow: &CategoryColumn,
    top_n: usize,
) -> FlowPreferenceTable {
    let k = flow.labels.len();

    let mut by_species: BTreeMap<&str, Vec<u64>> = BTreeMap::new();
    for (i, row) in table.rows().iter().enumerate() {
        let Some(species) = row.species.as_deref() else {
            continue;
        };
        let Some(j) = flow.assignments.get(i).copied().flatten() else {
            continue;
        };
        by_species.entry(species).or_insert_with(|| vec![0; k])[j] += 1;
    }

    let mut ranked: Vec<(&str, Vec<u64>, u64)> = by_species
        .into_iter()
        .map(|(species, counts)| {
            let total: u64 = counts.iter().sum();
            (species, counts, total)
        })
        .collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(top_n);

    let rows = ranked
        .into_iter()
        .filter(|(_, _, total)| *total > 0)
        .map(|(species, counts, total)| FlowPreference {
            species: species.to_string(),
            detections: total,
            percentages: counts
                .iter()
                .map(|&c| c as f64 / total as f64 * 100.0)
                .collect(),
        })
        .collect();

    FlowPreferenceTable {
        flow_labels: flow.labels.clone(),
        rows,
    }
}
