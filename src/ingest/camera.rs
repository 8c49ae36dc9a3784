//! Camera observation sheet loader

use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::config::ColumnMap;
use crate::core::events::{RawObservationRow, RawSlot};
use crate::core::schema::SlotSchema;
use crate::ingest::{parse_number, TimestampSource};

/// Load the wide-format camera sheet into raw observation rows.
///
/// The slot layout is discovered from the header and applied to every row.
/// Timestamps that fail to parse stay `None` here so expansion can drop
/// and count them; everything else is carried through verbatim.
pub fn load_camera_csv(path: &Path, columns: &ColumnMap) -> Result<(SlotSchema, Vec<RawObservationRow>)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open camera data {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("failed to read camera header from {}", path.display()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let schema = SlotSchema::discover(&headers)
        .with_context(|| format!("unusable camera header in {}", path.display()))?;
    let source = TimestampSource::locate(&headers, columns)
        .with_context(|| format!("no usable timestamp in camera header of {}", path.display()))?;

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        // header is line 1, so data starts at line 2
        let line = (i + 2) as u64;
        let record = record.with_context(|| format!("failed to read camera row at line {}", line))?;

        let slots = schema
            .slots
            .iter()
            .map(|slot| RawSlot {
                species: record.get(slot.species_col).unwrap_or("").to_string(),
                count: parse_number(record.get(slot.count_col)),
                note: slot
                    .notes_col
                    .and_then(|col| record.get(col))
                    .unwrap_or("")
                    .to_string(),
            })
            .collect();

        rows.push(RawObservationRow {
            line,
            timestamp: source.extract(&record),
            slots,
        });
    }

    info!(
        "loaded {} camera rows with {} species slots from {}",
        rows.len(),
        schema.slots.len(),
        path.display()
    );
    Ok((schema, rows))
}
