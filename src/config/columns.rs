//! Source column names for the two input sheets
//!
//! Defaults match the tide gate logger exports; deployments with different
//! headers override these in the settings file.

use serde::{Deserialize, Serialize};

/// Header names the loaders look for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    /// Combined timestamp column, preferred when present
    pub timestamp: String,
    /// Date half of a split timestamp
    pub date: String,
    /// Time half of a split timestamp
    pub time: String,
    pub depth: String,
    pub depth_inside: String,
    pub gate_primary: String,
    pub gate_secondary: String,
    pub air_temp: String,
    pub wind_speed: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            timestamp: "DateTime".to_string(),
            date: "Date".to_string(),
            time: "Time".to_string(),
            depth: "Tidal Level Outside Tidegate [m]".to_string(),
            depth_inside: "Tidal Level Inside Tidegate [m]".to_string(),
            gate_primary: "Gate Opening MTR [Degrees]".to_string(),
            gate_secondary: "Gate Opening Top Hinge [Degrees]".to_string(),
            air_temp: "Air Temp [C]".to_string(),
            wind_speed: "Wind Speed [km/h]".to_string(),
        }
    }
}
