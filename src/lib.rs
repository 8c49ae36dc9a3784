//! TideWatchr - Wildlife activity analysis around a tide gate
//!
//! Fuses irregular wildlife-camera observations with continuous tide-gate
//! sensor readings, classifies every monitoring period by tidal and gate
//! state, and reports where and when animals actually show up.
//!
//! ## Features
//!
//! - **Timeline fusion**: Camera events and sensor samples merged onto one
//!   timeline, with gap-bounded linear interpolation of sensor values
//! - **Tidal state classification**: Rising/falling/slack flow, normalized
//!   tide phase, and high/low tide landmarks from smoothed depth
//! - **Gate and environment buckets**: Gate opening categories, tide level
//!   tiers, and equal-width temperature bins
//! - **Two-denominator rates**: Camera activity over all periods and
//!   detection success over camera-active periods, never conflated
//! - **Chi-square screening**: Flags environmental dimensions whose
//!   detection counts deviate from independence
//! - **Species summaries**: Individual counts, event counts, and per-species
//!   tidal flow preferences
//!
//! ## Module Structure
//!
//! - `core` - Fusion, classification, rate, and hypothesis algorithms
//! - `ingest` - CSV loading for camera sheets and sensor logs
//! - `config` - Analysis settings and column mapping
//! - `report` - Serializable report types
//! - `export` - Fused-table CSV and report JSON writers
//! - `cli` - Command-line interface
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tidewatchr::config::AnalysisSettings;
//! use tidewatchr::core::pipeline::{run_analysis, IngestStats};
//!
//! let settings = AnalysisSettings::default();
//! let run = run_analysis(&events, &samples, IngestStats::default(), &settings, 10)?;
//!
//! println!(
//!     "detection success: {:.2}%",
//!     run.report.overview.detection_success_rate_pct
//! );
//! ```
//!
//! ## Rate Denominators
//!
//! | Mode       | Denominator             | Positive outcome      |
//! |------------|-------------------------|-----------------------|
//! | AllPeriods | Every monitoring period | Camera recorded       |
//! | ActiveOnly | Camera-active periods   | Animals detected      |
//!
//! Rate tables, pivots, and peak conditions are computed for both modes so
//! camera deployment bias stays visible next to animal behavior.

// Fusion and classification algorithms
pub mod core;

// Command-line interface
pub mod cli;

// Settings and column mapping
pub mod config;

// Fused-table CSV and report JSON writers
pub mod export;

// CSV ingestion for camera sheets and sensor logs
pub mod ingest;

// Serializable report types
pub mod report;

// Re-export commonly used types at crate root for convenience
pub use config::{AnalysisSettings, ColumnMap, SettingsError};
pub use report::{AnalysisReport, DatasetOverview};
pub use crate::core::{run_analysis, CategoryColumn, FusedTable, RateMode, SensorSample};
