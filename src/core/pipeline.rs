//! End-to-end analysis pipeline
//!
//! Fuses the two input streams, derives every categorical dimension once,
//! and assembles rate summaries, pivots, hypothesis tests, and species
//! tables into a single report.

use log::{info, warn};
use thiserror::Error;

use crate::config::settings::{AnalysisSettings, SettingsError};
use crate::core::binning;
use crate::core::events::DetectionEvent;
use crate::core::fusion::{self, FusedTable, SensorSample};
use crate::core::hypothesis;
use crate::core::rates::{self, RateMode};
use crate::core::species;
use crate::core::tidal;
use crate::report::{AnalysisReport, DatasetOverview, HypothesisReport, PivotSummary};

/// Failures that abort an analysis run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Row accounting handed over by the loaders
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestStats {
    pub camera_rows_dropped: u64,
    pub sensor_rows_dropped: u64,
}

/// Everything produced by one run: the report plus the fused timeline it
/// was computed from
#[derive(Debug)]
pub struct AnalysisRun {
    pub report: AnalysisReport,
    pub fused: FusedTable,
}

fn pct(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Run the full analysis: fuse, classify, aggregate, test.
///
/// An empty fused timeline short-circuits to an overview-only report.
pub fn run_analysis(
    events: &[DetectionEvent],
    samples: &[SensorSample],
    ingest: IngestStats,
    settings: &AnalysisSettings,
    top_species: usize,
) -> Result<AnalysisRun, PipelineError> {
    settings.validate()?;

    let (fused, _) = fusion::fuse(events, samples, &settings.interpolation);

    let mut overview = DatasetOverview {
        total_periods: fused.len() as u64,
        camera_active_periods: fused.camera_active_rows() as u64,
        animal_detection_events: fused.detection_rows() as u64,
        rows_dropped_camera: ingest.camera_rows_dropped,
        rows_dropped_sensor: ingest.sensor_rows_dropped,
        ..Default::default()
    };
    overview.camera_activity_rate_pct = pct(overview.camera_active_periods, overview.total_periods);
    overview.detection_rate_all_periods_pct =
        pct(overview.animal_detection_events, overview.total_periods);
    overview.detection_success_rate_pct =
        pct(overview.animal_detection_events, overview.camera_active_periods);

    if fused.is_empty() {
        warn!("fusion produced no rows, reporting overview only");
        return Ok(AnalysisRun {
            report: AnalysisReport::new(overview),
            fused,
        });
    }

    let landmarks = tidal::tide_landmarks(&fused, &settings.tidal);
    overview.high_tide_count = landmarks.high_tides.len() as u64;
    overview.low_tide_count = landmarks.low_tides.len() as u64;

    let flow = tidal::flow_column(&fused, &settings.tidal);
    let phase = tidal::phase_column(&fused, &settings.tidal);
    let gate_primary = settings
        .binning
        .gate_primary
        .column("gate_primary", &fused.series(|r| r.gate_primary_deg));
    let gate_secondary = settings
        .binning
        .gate_secondary
        .column("gate_secondary", &fused.series(|r| r.gate_secondary_deg));
    let combined_gate = binning::combined_gate(&gate_primary, &gate_secondary);
    let tide_tier = binning::quantile_tiers(
        "tide_level",
        &fused.depths(),
        settings.binning.tide_low_quantile,
        settings.binning.tide_high_quantile,
    );
    let temperature = binning::equal_width_bins(
        "air_temp",
        &fused.series(|r| r.air_temp_c),
        settings.binning.temperature_bins,
    );

    let mut report = AnalysisReport::new(overview);

    for mode in [RateMode::AllPeriods, RateMode::ActiveOnly] {
        for dim in [
            &flow,
            &phase,
            &gate_primary,
            &gate_secondary,
            &combined_gate,
            &tide_tier,
            &temperature,
        ] {
            report.rates.push(rates::aggregate(&fused, &[dim], mode));
        }
    }

    for mode in [RateMode::AllPeriods, RateMode::ActiveOnly] {
        for dim in [&combined_gate, &gate_primary] {
            let table = hypothesis::pivot_rates(&fused, dim, &flow, mode);
            let peak = table.peak();
            report.pivots.push(PivotSummary { table, peak });
        }
    }

    for dim in [&flow, &combined_gate] {
        report.hypotheses.push(HypothesisReport {
            dimension: dim.name.clone(),
            outcome: hypothesis::chi_square_independence(&fused, dim, &settings.hypothesis),
        });
    }

    report.species = species::species_summary(&fused);
    report.flow_preferences = species::species_flow_preferences(&fused, &flow, top_species);

    info!(
        "analysis complete: {} rate tables, {} pivots, {} hypothesis tests, {} species",
        report.rates.len(),
        report.pivots.len(),
        report.hypotheses.len(),
        report.species.len()
    );

    Ok(AnalysisRun { report, fused })
}
