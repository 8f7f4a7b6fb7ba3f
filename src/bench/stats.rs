//! Order statistics over latency and throughput samples.
//!
//! Every function returns `None` for an empty input instead of panicking.

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Copy of `values` sorted ascending
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Sample median of an ascending slice; even lengths average the middle pair
pub fn median_sorted(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

/// Nearest-rank percentile of an ascending slice: the value at
/// `floor(fraction * n)`, clamped to the last index.
///
/// Without the clamp `floor(0.99 * n)` reaches `n` for `n < 100`.
pub fn percentile_sorted(sorted: &[f64], fraction: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let index = ((fraction * n as f64).floor() as usize).min(n - 1);
    Some(sorted[index])
}
