//! Fusing camera events with sensor readings onto one timeline
//!
//! The fused timeline is the sorted union of every camera event timestamp
//! and every sensor timestamp. Sensor fields are carried onto camera-only
//! timestamps by gap-bounded linear interpolation; camera flags never leak
//! onto sensor-only rows.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Duration, NaiveDateTime};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::events::DetectionEvent;
use crate::core::series::interpolate::interpolate_onto;

/// One environmental sensor record. Fields the logger did not report, or
/// reported as dropout zeros, arrive here as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSample {
    pub timestamp: NaiveDateTime,
    pub depth: Option<f64>,
    pub depth_inside: Option<f64>,
    pub gate_primary_deg: Option<f64>,
    pub gate_secondary_deg: Option<f64>,
    pub air_temp_c: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
}

/// Interpolation behavior for sensor gaps
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationConfig {
    /// Largest sensor gap, in minutes, that interpolation may bridge
    pub max_gap_minutes: i64,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self { max_gap_minutes: 30 }
    }
}

/// One row of the fused timeline
#[derive(Debug, Clone, PartialEq)]
pub struct FusedRow {
    pub timestamp: NaiveDateTime,
    pub depth: Option<f64>,
    pub depth_inside: Option<f64>,
    pub gate_primary_deg: Option<f64>,
    pub gate_secondary_deg: Option<f64>,
    pub air_temp_c: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub species: Option<String>,
    pub count: u32,
    pub note: String,
    pub camera_active: bool,
    pub animal_detected: bool,
}

/// The fused timeline. Rows are ordered by timestamp; a timestamp with
/// several detections repeats, carrying identical sensor values.
#[derive(Debug, Clone, Default)]
pub struct FusedTable {
    rows: Vec<FusedRow>,
}

impl FusedTable {
    /// Wrap pre-built rows. The caller is responsible for timestamp order.
    pub fn from_rows(rows: Vec<FusedRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[FusedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Extract one sensor field as a sparse series
    pub fn series(&self, field: impl Fn(&FusedRow) -> Option<f64>) -> Vec<Option<f64>> {
        self.rows.iter().map(field).collect()
    }

    /// Outside tide depth per row
    pub fn depths(&self) -> Vec<Option<f64>> {
        self.series(|r| r.depth)
    }

    pub fn camera_active_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.camera_active).count()
    }

    pub fn detection_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.animal_detected).count()
    }
}

/// Row accounting from one fusion pass
#[derive(Debug, Clone, Copy, Default)]
pub struct FusionStats {
    pub event_rows: usize,
    pub sensor_rows: usize,
    pub union_timestamps: usize,
    pub fused_rows: usize,
    pub interpolated_cells: usize,
    pub duplicate_sensor_timestamps: usize,
}

fn average(group: &[&SensorSample], field: fn(&SensorSample) -> Option<f64>) -> Option<f64> {
    let values: Vec<f64> = group.iter().filter_map(|s| field(s)).collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Fuse detection events and sensor readings onto one timeline.
///
/// Sensor readings sharing a timestamp are averaged per field before
/// interpolation. Every distinct timestamp yields at least one row; a
/// timestamp with several events yields one row per event.
pub fn fuse(
    events: &[DetectionEvent],
    samples: &[SensorSample],
    config: &InterpolationConfig,
) -> (FusedTable, FusionStats) {
    let max_gap = Duration::minutes(config.max_gap_minutes);

    let mut by_time: BTreeMap<NaiveDateTime, Vec<&SensorSample>> = BTreeMap::new();
    for sample in samples {
        by_time.entry(sample.timestamp).or_default().push(sample);
    }
    let duplicate_sensor_timestamps = by_time.values().filter(|group| group.len() > 1).count();
    if duplicate_sensor_timestamps > 0 {
        debug!(
            "averaged sensor readings at {} duplicated timestamps",
            duplicate_sensor_timestamps
        );
    }

    let mut union: BTreeSet<NaiveDateTime> = by_time.keys().copied().collect();
    union.extend(events.iter().map(|e| e.timestamp));
    let timeline: Vec<NaiveDateTime> = union.into_iter().collect();

    let field_series = |field: fn(&SensorSample) -> Option<f64>| -> Vec<Option<f64>> {
        let known: Vec<(NaiveDateTime, f64)> = by_time
            .iter()
            .filter_map(|(t, group)| average(group, field).map(|v| (*t, v)))
            .collect();
        interpolate_onto(&timeline, &known, max_gap)
    };

    let depth = field_series(|s| s.depth);
    let depth_inside = field_series(|s| s.depth_inside);
    let gate_primary = field_series(|s| s.gate_primary_deg);
    let gate_secondary = field_series(|s| s.gate_secondary_deg);
    let air_temp = field_series(|s| s.air_temp_c);
    let wind_speed = field_series(|s| s.wind_speed_kmh);

    let mut events_at: HashMap<NaiveDateTime, Vec<&DetectionEvent>> = HashMap::new();
    for event in events {
        events_at.entry(event.timestamp).or_default().push(event);
    }

    let mut rows = Vec::with_capacity(timeline.len());
    let mut interpolated_cells = 0usize;
    for (i, &t) in timeline.iter().enumerate() {
        if !by_time.contains_key(&t) {
            for value in [depth[i], depth_inside[i], gate_primary[i], gate_secondary[i], air_temp[i], wind_speed[i]] {
                if value.is_some() {
                    interpolated_cells += 1;
                }
            }
        }

        let sensor_row = |species: Option<String>, count: u32, note: String, camera_active: bool, animal_detected: bool| FusedRow {
            timestamp: t,
            depth: depth[i],
            depth_inside: depth_inside[i],
            gate_primary_deg: gate_primary[i],
            gate_secondary_deg: gate_secondary[i],
            air_temp_c: air_temp[i],
            wind_speed_kmh: wind_speed[i],
            species,
            count,
            note,
            camera_active,
            animal_detected,
        };

        match events_at.get(&t) {
            Some(group) => {
                for event in group {
                    rows.push(sensor_row(
                        event.species().map(str::to_string),
                        event.count(),
                        event.note.clone(),
                        true,
                        event.is_detection(),
                    ));
                }
            }
            None => rows.push(sensor_row(None, 0, String::new(), false, false)),
        }
    }

    let stats = FusionStats {
        event_rows: events.len(),
        sensor_rows: samples.len(),
        union_timestamps: timeline.len(),
        fused_rows: rows.len(),
        interpolated_cells,
        duplicate_sensor_timestamps,
    };
    info!(
        "fused {} events and {} sensor readings into {} rows ({} timestamps, {} interpolated cells)",
        stats.event_rows, stats.sensor_rows, stats.fused_rows, stats.union_timestamps, stats.interpolated_cells
    );

    (FusedTable { rows }, stats)
}
