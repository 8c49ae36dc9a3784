//! Environmental sensor log loader

use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::config::ColumnMap;
use crate::core::fusion::SensorSample;
use crate::ingest::{parse_number, TimestampSource};

/// Load the sensor log into samples.
///
/// A zero reading in either tide level column is a logger dropout and
/// becomes a missing value; gate angles and weather keep zeros. Rows with
/// unparseable timestamps are dropped and counted.
pub fn load_sensor_csv(path: &Path, columns: &ColumnMap) -> Result<(Vec<SensorSample>, u64)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open sensor data {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("failed to read sensor header from {}", path.display()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let source = TimestampSource::locate(&headers, columns)
        .with_context(|| format!("no usable timestamp in sensor header of {}", path.display()))?;

    let find = |name: &str| headers.iter().position(|h| h.trim() == name);
    let depth_col = find(&columns.depth);
    let depth_inside_col = find(&columns.depth_inside);
    let gate_primary_col = find(&columns.gate_primary);
    let gate_secondary_col = find(&columns.gate_secondary);
    let air_temp_col = find(&columns.air_temp);
    let wind_speed_col = find(&columns.wind_speed);

    for (name, col) in [
        (&columns.depth, depth_col),
        (&columns.depth_inside, depth_inside_col),
        (&columns.gate_primary, gate_primary_col),
        (&columns.gate_secondary, gate_secondary_col),
        (&columns.air_temp, air_temp_col),
        (&columns.wind_speed, wind_speed_col),
    ] {
        if col.is_none() {
            warn!("sensor column '{}' not found, field will be empty", name);
        }
    }

    let mut samples = Vec::new();
    let mut dropped = 0u64;
    for (i, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("failed to read sensor row at line {}", i + 2))?;
        let Some(timestamp) = source.extract(&record) else {
            dropped += 1;
            continue;
        };

        let value = |col: Option<usize>| col.and_then(|c| parse_number(record.get(c)));
        let depth_value = |col: Option<usize>| value(col).filter(|v| *v != 0.0);

        samples.push(SensorSample {
            timestamp,
            depth: depth_value(depth_col),
            depth_inside: depth_value(depth_inside_col),
            gate_primary_deg: value(gate_primary_col),
            gate_secondary_deg: value(gate_secondary_col),
            air_temp_c: value(air_temp_col),
            wind_speed_kmh: value(wind_speed_col),
        });
    }

    if dropped > 0 {
        warn!("dropped {} sensor rows with unparseable timestamps", dropped);
    }
    info!("loaded {} sensor readings from {}", samples.len(), path.display());
    Ok((samples, dropped))
}
