//! Ordering checks on sample vectors.
//!
//! Empty and single-element slices count as monotonic in every sense.

pub fn is_monotonic(values: &[f64]) -> bool {
    is_monotonic_increasing(values) || is_monotonic_decreasing(values)
}

pub fn is_monotonic_increasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[1] >= w[0])
}

pub fn is_monotonic_decreasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[1] <= w[0])
}

pub fn is_strictly_monotonic(values: &[f64]) -> bool {
    is_strictly_monotonic_increasing(values) || is_strictly_monotonic_decreasing(values)
}

/// True if every element is strictly greater than the previous one.
///
/// NaN never compares greater, so a slice containing NaN is rejected.
pub fn is_strictly_monotonic_increasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[1] > w[0])
}

pub fn is_strictly_monotonic_decreasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[1] < w[0])
}

/// Returns true if all `values` lie inside `[min(interval), max(interval)]`.
///
/// `interval` must be sorted ascending. An empty interval contains nothing.
pub fn is_values_in_interval(values: &[f64], interval: &[f64]) -> bool {
    match (interval.first(), interval.last()) {
        (Some(&lo), Some(&hi)) => values.iter().all(|&v| lo <= v && v <= hi),
        _ => false,
    }
}

/// Sort `(x, y)` pairs by abscissa, returning the two reordered vectors.
pub fn sort_pairs(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut pairs: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    pairs.into_iter().unzip()
}
