//! Series utilities shared by the fusion and classification stages

pub mod interpolate;
pub mod stats;
