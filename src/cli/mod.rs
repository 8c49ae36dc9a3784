// src/cli/mod.rs
//
// Command-line interface: argument parsing, run orchestration and
// terminal rendering

mod args;
mod output;

pub use args::Args;
pub use output::{format_json, format_report};

use anyhow::Context;

use crate::config::AnalysisSettings;
use crate::core::events::expand_observations;
use crate::core::pipeline::{run_analysis, IngestStats};
use crate::export::{write_fused_csv, write_report_json};
use crate::ingest::camera::load_camera_csv;
use crate::ingest::sensor::load_sensor_csv;

/// Run a full analysis from parsed arguments
pub fn run(args: Args) -> anyhow::Result<()> {
    let mut settings = match &args.settings {
        Some(path) => AnalysisSettings::from_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => AnalysisSettings::default(),
    };
    if let Some(minutes) = args.max_gap_minutes {
        settings.interpolation.max_gap_minutes = minutes;
    }
    if let Some(threshold) = args.slack_threshold {
        settings.tidal.slack_threshold = threshold;
    }

    let (_schema, observations) = load_camera_csv(&args.camera, &settings.columns)?;
    let (events, camera_rows_dropped) = expand_observations(&observations);
    let (samples, sensor_rows_dropped) = load_sensor_csv(&args.sensor, &settings.columns)?;

    let ingest = IngestStats {
        camera_rows_dropped,
        sensor_rows_dropped,
    };
    let run = run_analysis(&events, &samples, ingest, &settings, args.top_species)?;

    if let Some(path) = &args.output {
        write_fused_csv(path, &run.fused)?;
    }
    if let Some(path) = &args.report_json {
        write_report_json(path, &run.report)?;
    }

    if args.json {
        println!("{}", format_json(&run.report)?);
    } else {
        print!("{}", format_report(&run.report, args.verbose));
    }

    Ok(())
}
