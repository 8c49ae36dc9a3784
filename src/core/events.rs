//! Detection events and species name normalization

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::NaiveDateTime;
use log::warn;

/// Note attached to observation rows where the camera saw no animals
pub const NO_DETECTION_NOTE: &str = "No animals detected";

/// Species placeholder for a positive count with no recorded name
pub const UNKNOWN_SPECIES: &str = "Unknown";

/// Common-name corrections accumulated from the field logs
const SPECIES_SYNONYMS: &[(&str, &str)] = &[
    ("unknown", "Unknown"),
    ("brant", "Branta canadensis"),
    ("canada goose", "Branta canadensis"),
    ("canada geese", "Branta canadensis"),
    ("cackling goose", "Branta hutchinsii"),
    ("great egret", "Ardea alba"),
    ("great blue heron", "Ardea herodias"),
    ("belted kingfisher", "Megaceryle alcyon"),
    ("double-crested cormorant", "Nannopterum auritus"),
    ("pelagic cormorant", "Urile pelagicus"),
    ("river otter", "Lontra canadensis"),
    ("columbian black-tailed deer", "Odocoileus Hemionus Columbianus"),
    ("black-tailed deer", "Odocoileus Hemionus Columbianus"),
    ("turkey vulture", "Cathartes aura"),
    ("red-necked grebe", "Podiceps grisegena"),
    ("common loon", "Gavia immer"),
    ("common merganser", "Mergus merganser"),
    ("bufflehead", "Bucephala albeola"),
    ("mallard", "Anas platyrhynchos"),
    ("american crow", "Corvus brachyrhynchos"),
    ("cormorant", "Phalacrocoracidae"),
];

/// Lowercased lookup table, extended so every canonical name maps to itself
fn synonym_table() -> &'static HashMap<String, String> {
    static TABLE: OnceLock<HashMap<String, String>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut map: HashMap<String, String> = HashMap::new();
        for &(from, to) in SPECIES_SYNONYMS {
            map.insert(from.to_string(), to.to_string());
        }
        for &(_, to) in SPECIES_SYNONYMS {
            map.entry(to.to_lowercase()).or_insert_with(|| to.to_string());
        }
        map
    })
}

/// Title-case in the field-log style: a letter after any non-letter starts
/// a new word, everything else is lowered
fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut boundary = true;
    for c in raw.chars() {
        if c.is_alphabetic() {
            if boundary {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            boundary = false;
        } else {
            out.push(c);
            boundary = true;
        }
    }
    out
}

/// Normalize a raw species name: trim, apply the synonym table, otherwise
/// title-case. Normalizing an already normalized name changes nothing.
pub fn normalize_species_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let key = trimmed.to_lowercase();
    match synonym_table().get(&key) {
        Some(canonical) => canonical.clone(),
        None => title_case(trimmed),
    }
}

/// One camera observation record after wide-slot expansion.
///
/// Either a named species with a count of at least one, or a no-detection
/// record with a count of zero. The constructors keep the two in lockstep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionEvent {
    pub timestamp: NaiveDateTime,
    species: Option<String>,
    count: u32,
    pub note: String,
}

impl DetectionEvent {
    /// Observation of a named species. A count below one means the count
    /// went unrecorded and is stored as one animal.
    pub fn detection(timestamp: NaiveDateTime, species: String, count: u32, note: String) -> Self {
        Self {
            timestamp,
            species: Some(species),
            count: count.max(1),
            note,
        }
    }

    /// Camera triggered with no animals in frame
    pub fn no_detection(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            species: None,
            count: 0,
            note: NO_DETECTION_NOTE.to_string(),
        }
    }

    pub fn species(&self) -> Option<&str> {
        self.species.as_deref()
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Whether an animal was actually seen
    pub fn is_detection(&self) -> bool {
        self.species.is_some()
    }
}

/// Unexpanded content of one species slot in a camera row
#[derive(Debug, Clone, Default)]
pub struct RawSlot {
    pub species: String,
    pub count: Option<f64>,
    pub note: String,
}

/// One camera CSV row before expansion, slots aligned with the discovered
/// schema. `line` is the 1-based source line for diagnostics.
#[derive(Debug, Clone)]
pub struct RawObservationRow {
    pub line: u64,
    pub timestamp: Option<NaiveDateTime>,
    pub slots: Vec<RawSlot>,
}

fn to_count(value: f64) -> u32 {
    if value < 1.0 {
        1
    } else {
        value.round() as u32
    }
}

/// Expand wide observation rows into detection events.
///
/// Each occupied species slot becomes its own event; a row with no usable
/// slot content becomes a single no-detection event. Rows without a
/// parseable timestamp are dropped, and the number of dropped rows is
/// returned alongside the events.
pub fn expand_observations(rows: &[RawObservationRow]) -> (Vec<DetectionEvent>, u64) {
    let mut events = Vec::with_capacity(rows.len());
    let mut dropped = 0u64;

    for row in rows {
        let Some(timestamp) = row.timestamp else {
            dropped += 1;
            continue;
        };

        let mut row_events = 0usize;
        for slot in &row.slots {
            let name = slot.species.trim();
            let note = slot.note.trim().to_string();
            let raw_count = slot.count.filter(|c| c.is_finite());

            // 'nan' cells appear in sheets that went through a spreadsheet
            // round trip and mean the slot is empty
            if name.is_empty() || name == "nan" {
                if let Some(count) = raw_count.filter(|c| *c > 0.0) {
                    events.push(DetectionEvent::detection(
                        timestamp,
                        UNKNOWN_SPECIES.to_string(),
                        to_count(count),
                        note,
                    ));
                    row_events += 1;
                }
                continue;
            }

            let count = raw_count.map(to_count).unwrap_or(1);
            events.push(DetectionEvent::detection(
                timestamp,
                normalize_species_name(name),
                count,
                note,
            ));
            row_events += 1;
        }

        if row_events == 0 {
            events.push(DetectionEvent::no_detection(timestamp));
        }
    }

    if dropped > 0 {
        warn!("dropped {} camera rows with unparseable timestamps", dropped);
    }

    (events, dropped)
}
