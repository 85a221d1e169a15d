//! Order statistics and simple summaries over `f64` slices.

use std::cmp::Ordering;

/// Median of `values`, reordering them in place.
pub fn median_mut(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

pub fn median(values: &[f64]) -> Option<f64> {
    median_mut(&mut values.to_vec())
}

/// `q`-th percentile (`0..=100`) with linear interpolation between order
/// statistics.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=100.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Range `max - min`.
pub fn peak_to_peak(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let (lo, hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    Some(hi - lo)
}

/// Median spacing between consecutive samples.
pub fn median_spacing(times: &[f64]) -> Option<f64> {
    if times.len() < 2 {
        return None;
    }
    let mut diffs: Vec<f64> = times.windows(2).map(|w| w[1] - w[0]).collect();
    median_mut(&mut diffs)
}
