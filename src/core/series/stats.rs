//! Statistical helpers for irregularly sampled series

/// Compute median of a slice
pub fn median(data: &mut [f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    data.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = data.len() / 2;
    if data.len() % 2 == 0 {
        (data[mid - 1] + data[mid]) / 2.0
    } else {
        data[mid]
    }
}

/// Linearly interpolated quantile of sorted data, q clamped to [0, 1]
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Minimum and maximum of a slice
pub fn min_max(data: &[f64]) -> Option<(f64, f64)> {
    let first = *data.first()?;
    let mut min = first;
    let mut max = first;
    for &v in &data[1..] {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    Some((min, max))
}

/// Centered rolling mean over a sparse series.
///
/// A position only gets a value when the full window fits inside the data
/// and every sample in it is present; everything else stays empty.
pub fn rolling_mean_centered(data: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let n = data.len();
    if window == 0 || window > n {
        return vec![None; n];
    }

    let half_left = (window - 1) / 2;
    let half_right = window / 2;

    let mut result = vec![None; n];
    for i in half_left..n - half_right {
        let slice = &data[i - half_left..=i + half_right];
        if slice.iter().all(|v| v.is_some()) {
            let sum: f64 = slice.iter().flatten().sum();
            result[i] = Some(sum / window as f64);
        }
    }
    result
}

/// Indices of local maxima separated by at least `min_distance` samples.
///
/// When two maxima fall closer than the spacing, the higher one wins.
pub fn find_peaks(signal: &[f64], min_distance: usize) -> Vec<usize> {
    let mut peaks: Vec<usize> = Vec::new();

    for i in 1..signal.len().saturating_sub(1) {
        if !(signal[i] > signal[i - 1] && signal[i] > signal[i + 1]) {
            continue;
        }
        match peaks.last().copied() {
            Some(last) if i - last < min_distance => {
                if signal[i] > signal[last] {
                    let end = peaks.len() - 1;
                    peaks[end] = i;
                }
            }
            _ => peaks.push(i),
        }
    }

    peaks
}
