//! Command line arguments

use std::path::PathBuf;

use clap::Parser;

/// Fuse wildlife camera detections with tide gate sensor logs and report
/// detection rates across tidal and gate conditions
#[derive(Parser, Debug)]
#[command(name = "tidewatchr", version, about)]
pub struct Args {
    /// Camera observation CSV with wide species slots
    #[arg(short, long, env = "TIDEWATCHR_CAMERA")]
    pub camera: PathBuf,

    /// Environmental sensor CSV
    #[arg(short, long, env = "TIDEWATCHR_SENSOR")]
    pub sensor: PathBuf,

    /// JSON settings file; absent sections keep their defaults
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Write the fused timeline to this CSV path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the full report as JSON to this path
    #[arg(long)]
    pub report_json: Option<PathBuf>,

    /// Largest sensor gap to interpolate across, in minutes
    #[arg(long)]
    pub max_gap_minutes: Option<i64>,

    /// Slack water threshold in metres per hour
    #[arg(long)]
    pub slack_threshold: Option<f64>,

    /// How many species to rank in the flow preference table
    #[arg(long, default_value_t = 10)]
    pub top_species: usize,

    /// Print the report as JSON instead of tables
    #[arg(long)]
    pub json: bool,

    /// Include per-group totals and the full species list
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_invocation() {
        let args = Args::parse_from(["tidewatchr", "-c", "camera.csv", "-s", "sensor.csv"]);
        assert_eq!(args.camera, PathBuf::from("camera.csv"));
        assert_eq!(args.sensor, PathBuf::from("sensor.csv"));
        assert_eq!(args.top_species, 10);
        assert!(!args.json);
        assert!(args.output.is_none());
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "tidewatchr",
            "--camera",
            "camera.csv",
            "--sensor",
            "sensor.csv",
            "--max-gap-minutes",
            "45",
            "--slack-threshold",
            "0.1",
            "--top-species",
            "5",
            "--json",
            "-v",
        ]);
        assert_eq!(args.max_gap_minutes, Some(45));
        assert_eq!(args.slack_threshold, Some(0.1));
        assert_eq!(args.top_species, 5);
        assert!(args.json);
        assert!(args.verbose);
    }

    #[test]
    fn test_missing_inputs_rejected() {
        assert!(Args::try_parse_from(["tidewatchr", "-c", "camera.csv"]).is_err());
    }
}
