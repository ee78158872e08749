//! Summary statistics for permutation nulls.
//!
//! Standard deviations are population (ddof = 0) deviations.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn pstdev(values: &[f64], mean_val: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let ss: f64 = values
        .iter()
        .map(|v| {
            let d = v - mean_val;
            d * d
        })
        .sum();
    (ss / values.len() as f64).sqrt()
}

/// Mean and population standard deviation of integer replicate statistics.
pub fn null_summary(values: &[i64]) -> (f64, f64) {
    let as_f64: Vec<f64> = values.iter().map(|&v| v as f64).collect();
    let m = mean(&as_f64);
    (m, pstdev(&as_f64, m))
}

/// Returns `None` when the null has no spread.
pub fn empirical_z(observed: f64, null_mean: f64, null_std: f64) -> Option<f64> {
    if null_std == 0.0 || !null_std.is_finite() {
        return None;
    }
    Some((observed - null_mean) / null_std)
}

pub fn round_to(x: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (x * scale).round() / scale
}
