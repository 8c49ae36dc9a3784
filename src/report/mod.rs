//! Report assembly types

pub mod summary;

pub use summary::{AnalysisReport, DatasetOverview, HypothesisReport, PivotSummary};
