//! Gap-bounded linear interpolation onto a reference timeline

use chrono::{Duration, NaiveDateTime};

/// Linear interpolation between two timestamped values
fn lerp(t0: NaiveDateTime, v0: f64, t1: NaiveDateTime, v1: f64, t: NaiveDateTime) -> f64 {
    let span = (t1 - t0).num_seconds() as f64;
    if span <= 0.0 {
        return v0;
    }
    let offset = (t - t0).num_seconds() as f64;
    v0 + (v1 - v0) * (offset / span)
}

/// Project known samples onto a timeline.
///
/// Both inputs must be sorted by timestamp. Exact matches pass through
/// unchanged. A timestamp strictly between two known samples is linearly
/// interpolated only when the flanking gap is at most `max_gap`; wider gaps
/// stay empty. Timestamps before the first or after the last known sample
/// are never extrapolated.
pub fn interpolate_onto(
    timeline: &[NaiveDateTime],
    known: &[(NaiveDateTime, f64)],
    max_gap: Duration,
) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(timeline.len());
    if known.is_empty() {
        result.resize(timeline.len(), None);
        return result;
    }

    // index of the first known sample at or after the cursor
    let mut next = 0usize;
    for &t in timeline {
        while next < known.len() && known[next].0 < t {
            next += 1;
        }

        let value = if next < known.len() && known[next].0 == t {
            Some(known[next].1)
        } else if next == 0 || next == known.len() {
            None
        } else {
            let (t0, v0) = known[next - 1];
            let (t1, v1) = known[next];
            if t1 - t0 <= max_gap {
                Some(lerp(t0, v0, t1, v1, t))
            } else {
                None
            }
        };
        result.push(value);
    }

    result
}
