//! Camera header layout discovery
//!
//! Field cameras export one row per trigger with a variable number of
//! `Species N` / `Species N Count` column pairs. The layout is discovered
//! from the header once and reused for every row.

use log::warn;
use thiserror::Error;

/// Camera sheets that cannot be analyzed at all
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("camera header has no 'Species 1' column (found {found:?})")]
    MissingPrimarySpecies { found: Vec<String> },
}

/// Column positions for one species slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotDescriptor {
    pub number: u32,
    pub species_col: usize,
    pub count_col: usize,
    pub notes_col: Option<usize>,
}

/// Discovered camera sheet layout, slots ordered by slot number
#[derive(Debug, Clone)]
pub struct SlotSchema {
    pub slots: Vec<SlotDescriptor>,
}

impl SlotSchema {
    /// Scan a camera CSV header for species slot groups.
    ///
    /// A slot pairs `Species N` with `Species N Count` (or the older
    /// `Species Count N` form) plus an optional `Notes N` column. A species
    /// column without a count column is skipped with a warning; a sheet
    /// without `Species 1` is rejected outright.
    pub fn discover(headers: &[String]) -> Result<Self, SchemaError> {
        let trimmed: Vec<&str> = headers.iter().map(|h| h.trim()).collect();

        // species columns are exactly two tokens: the word and a number
        let mut species_cols: Vec<(u32, usize)> = Vec::new();
        for (idx, name) in trimmed.iter().enumerate() {
            let mut parts = name.split_whitespace();
            if parts.next() != Some("Species") {
                continue;
            }
            let Some(number) = parts.next() else { continue };
            if parts.next().is_some() {
                continue;
            }
            if let Ok(n) = number.parse::<u32>() {
                species_cols.push((n, idx));
            }
        }

        if !species_cols.iter().any(|&(n, _)| n == 1) {
            return Err(SchemaError::MissingPrimarySpecies {
                found: headers.to_vec(),
            });
        }
        species_cols.sort_by_key(|&(n, _)| n);

        let position = |name: String| trimmed.iter().position(|h| *h == name);

        let mut slots = Vec::with_capacity(species_cols.len());
        for (number, species_col) in species_cols {
            let count_col = position(format!("Species {} Count", number))
                .or_else(|| position(format!("Species Count {}", number)));
            let Some(count_col) = count_col else {
                warn!(
                    "species column 'Species {}' has no matching count column, slot skipped",
                    number
                );
                continue;
            };
            slots.push(SlotDescriptor {
                number,
                species_col,
                count_col,
                notes_col: position(format!("Notes {}", number)),
            });
        }

        Ok(Self { slots })
    }
}
