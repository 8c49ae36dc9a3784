//! Assembled analysis report

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::core::hypothesis::{HypothesisOutcome, PeakCondition, PivotTable};
use crate::core::rates::RateSummary;
use crate::core::species::{FlowPreferenceTable, SpeciesSummary};

/// Dataset-level counts and headline rates
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatasetOverview {
    pub total_periods: u64,
    pub camera_active_periods: u64,
    pub animal_detection_events: u64,
    /// Camera-active periods per total period
    pub camera_activity_rate_pct: f64,
    /// Detections per total period
    pub detection_rate_all_periods_pct: f64,
    /// Detections per camera-active period
    pub detection_success_rate_pct: f64,
    pub rows_dropped_camera: u64,
    pub rows_dropped_sensor: u64,
    pub high_tide_count: u64,
    pub low_tide_count: u64,
}

/// A rate pivot together with its peak cell
#[derive(Debug, Clone, Serialize)]
pub struct PivotSummary {
    pub table: PivotTable,
    pub peak: Option<PeakCondition>,
}

/// A chi-square outcome labeled with the dimension it tested
#[derive(Debug, Clone, Serialize)]
pub struct HypothesisReport {
    pub dimension: String,
    pub outcome: HypothesisOutcome,
}

/// Everything one analysis run produces
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub run_id: String,
    pub generated_at: NaiveDateTime,
    pub overview: DatasetOverview,
    pub rates: Vec<RateSummary>,
    pub pivots: Vec<PivotSummary>,
    pub hypotheses: Vec<HypothesisReport>,
    pub species: Vec<SpeciesSummary>,
    pub flow_preferences: FlowPreferenceTable,
}

impl AnalysisReport {
    /// Start an empty report shell for this run
    pub fn new(overview: DatasetOverview) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            generated_at: chrono::Local::now().naive_local(),
            overview,
            rates: Vec::new(),
            pivots: Vec::new(),
            hypotheses: Vec::new(),
            species: Vec::new(),
            flow_preferences: FlowPreferenceTable::default(),
        }
    }
}
