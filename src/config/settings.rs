//! Run settings: interpolation, tidal classification, bucketing, testing
//!
//! Defaults reproduce the deployed monitoring configuration. Every section
//! can be overridden independently from a JSON settings file; absent
//! sections and fields keep their defaults.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::columns::ColumnMap;
use crate::core::binning::BinningConfig;
use crate::core::fusion::InterpolationConfig;
use crate::core::hypothesis::HypothesisConfig;
use crate::core::tidal::TidalConfig;

/// Settings that cannot be loaded or cannot drive a run
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not read settings file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse settings file {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {name} buckets: {reason}")]
    InvalidBins { name: &'static str, reason: String },
    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },
    #[error("{field} must not be negative")]
    Negative { field: &'static str },
    #[error("{field} must lie strictly between 0 and 1")]
    UnitInterval { field: &'static str },
    #[error("tide quantiles must satisfy low < high (got {low} and {high})")]
    QuantileOrder { low: f64, high: f64 },
}

/// Full set of tunables for one analysis run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub interpolation: InterpolationConfig,
    pub tidal: TidalConfig,
    pub binning: BinningConfig,
    pub hypothesis: HypothesisConfig,
    pub columns: ColumnMap,
}

impl AnalysisSettings {
    /// Load settings from a JSON file, with defaults for absent sections
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject settings that cannot drive a run
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.interpolation.max_gap_minutes <= 0 {
            return Err(SettingsError::NonPositive {
                field: "interpolation.max_gap_minutes",
            });
        }
        if self.tidal.slack_threshold < 0.0 {
            return Err(SettingsError::Negative {
                field: "tidal.slack_threshold",
            });
        }
        if self.tidal.periods_per_hour <= 0.0 {
            return Err(SettingsError::NonPositive {
                field: "tidal.periods_per_hour",
            });
        }
        if self.tidal.smoothing_window == 0 {
            return Err(SettingsError::NonPositive {
                field: "tidal.smoothing_window",
            });
        }
        if self.tidal.phase_bins == 0 {
            return Err(SettingsError::NonPositive {
                field: "tidal.phase_bins",
            });
        }
        if self.binning.temperature_bins == 0 {
            return Err(SettingsError::NonPositive {
                field: "binning.temperature_bins",
            });
        }

        self.binning
            .gate_primary
            .validate()
            .map_err(|reason| SettingsError::InvalidBins {
                name: "gate_primary",
                reason,
            })?;
        self.binning
            .gate_secondary
            .validate()
            .map_err(|reason| SettingsError::InvalidBins {
                name: "gate_secondary",
                reason,
            })?;

        for (field, q) in [
            ("binning.tide_low_quantile", self.binning.tide_low_quantile),
            ("binning.tide_high_quantile", self.binning.tide_high_quantile),
        ] {
            if !(q > 0.0 && q < 1.0) {
                return Err(SettingsError::UnitInterval { field });
            }
        }
        if self.binning.tide_low_quantile >= self.binning.tide_high_quantile {
            return Err(SettingsError::QuantileOrder {
                low: self.binning.tide_low_quantile,
                high: self.binning.tide_high_quantile,
            });
        }

        let alpha = self.hypothesis.significance_level;
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(SettingsError::UnitInterval {
                field: "hypothesis.significance_level",
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AnalysisSettings::default().validate().is_ok());
    }

    #[test]
    fn test_default_values_match_deployment() {
        let settings = AnalysisSettings::default();
        assert_eq!(settings.interpolation.max_gap_minutes, 30);
        assert!((settings.tidal.slack_threshold - 0.05).abs() < 1e-9);
        assert_eq!(settings.tidal.smoothing_window, 25);
        assert_eq!(settings.tidal.landmark_min_distance, 20);
        assert_eq!(settings.tidal.phase_bins, 12);
        assert_eq!(settings.hypothesis.min_detections, 20);
        assert_eq!(settings.binning.temperature_bins, 5);
    }

    #[test]
    fn test_partial_json_overrides_one_section() {
        let settings: AnalysisSettings = serde_json::from_str(
            r#"{"interpolation": {"max_gap_minutes": 45}, "tidal": {"slack_threshold": 0.1}}"#,
        )
        .unwrap();

        assert_eq!(settings.interpolation.max_gap_minutes, 45);
        assert!((settings.tidal.slack_threshold - 0.1).abs() < 1e-9);
        // untouched sections keep their defaults
        assert_eq!(settings.tidal.smoothing_window, 25);
        assert_eq!(settings.hypothesis.min_detections, 20);
    }

    #[test]
    fn test_zero_gap_is_rejected() {
        let mut settings = AnalysisSettings::default();
        settings.interpolation.max_gap_minutes = 0;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::NonPositive { .. })
        ));
    }

    #[test]
    fn test_negative_slack_threshold_is_rejected() {
        let mut settings = AnalysisSettings::default();
        settings.tidal.slack_threshold = -0.1;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Negative { .. })
        ));
    }

    #[test]
    fn test_misordered_quantiles_are_rejected() {
        let mut settings = AnalysisSettings::default();
        settings.binning.tide_low_quantile = 0.8;
        settings.binning.tide_high_quantile = 0.2;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::QuantileOrder { .. })
        ));
    }

    #[test]
    fn test_bad_gate_bins_are_rejected() {
        let mut settings = AnalysisSettings::default();
        settings.binning.gate_primary.boundaries = vec![5.0, -1.0, 39.0, 63.0, 88.0];
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidBins { name: "gate_primary", .. })
        ));
    }
}
