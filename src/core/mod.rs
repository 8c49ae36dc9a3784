//! Core fusion, classification, and statistics modules

pub mod binning;
pub mod events;
pub mod fusion;
pub mod hypothesis;
pub mod pipeline;
pub mod rates;
pub mod schema;
pub mod series;
pub mod species;
pub mod tidal;

pub use binning::CategoryColumn;
pub use fusion::{FusedTable, SensorSample};
pub use pipeline::run_analysis;
pub use rates::RateMode;
