//! Configuration module
//!
//! Settings come from three layers: built-in defaults, an optional JSON
//! settings file, and command-line overrides, applied in that order.

pub mod columns;
pub mod settings;

pub use columns::ColumnMap;
pub use settings::{AnalysisSettings, SettingsError};
