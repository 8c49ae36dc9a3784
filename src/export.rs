//! Flat-file persistence for the fused timeline and the report

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::core::fusion::FusedTable;
use crate::report::AnalysisReport;

/// Column order of the fused timeline CSV
const FUSED_HEADER: [&str; 12] = [
    "timestamp",
    "tide_depth_m",
    "tide_depth_inside_m",
    "gate_primary_deg",
    "gate_secondary_deg",
    "air_temp_c",
    "wind_speed_kmh",
    "species",
    "count",
    "note",
    "camera_active",
    "animal_detected",
];

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write the fused timeline as CSV, one row per observation.
///
/// Missing sensor values stay empty cells; the count is only written for
/// camera-active rows so sensor-only rows do not read as zero detections.
pub fn write_fused_csv(path: &Path, table: &FusedTable) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer
        .write_record(FUSED_HEADER)
        .context("failed to write fused header")?;

    for row in table.rows() {
        writer
            .write_record([
                row.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                cell(row.depth),
                cell(row.depth_inside),
                cell(row.gate_primary_deg),
                cell(row.gate_secondary_deg),
                cell(row.air_temp_c),
                cell(row.wind_speed_kmh),
                row.species.clone().unwrap_or_default(),
                if row.camera_active {
                    row.count.to_string()
                } else {
                    String::new()
                },
                row.note.clone(),
                row.camera_active.to_string(),
                row.animal_detected.to_string(),
            ])
            .with_context(|| format!("failed to write fused row at {}", row.timestamp))?;
    }

    writer.flush().context("failed to flush fused csv")?;
    info!("wrote {} fused rows to {}", table.len(), path.display());
    Ok(())
}

/// Write the analysis report as pretty-printed JSON
pub fn write_report_json(path: &Path, report: &AnalysisReport) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, report).context("failed to serialize report")?;
    info!("wrote report {} to {}", report.run_id, path.display());
    Ok(())
}
