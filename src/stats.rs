//! Statistical primitives shared by the detection rules.
//!
//! Both outlier rules build on these: the IQR rule uses
//! [`quantile`]/[`iqr_fences`], the z-score rule uses [`mean`] and
//! [`sample_std`]. All functions operate on finite values only; callers
//! filter nulls and non-finite floats before calling.

// Statistical computation requires casts and float literals
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

/// Quantile of an ascending-sorted slice by linear interpolation between
/// order statistics. `q` is in `[0, 1]`. Returns `None` for empty input.
#[must_use]
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let n = sorted.len();
    if n == 1 {
        return Some(sorted[0]);
    }

    let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;

    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Arithmetic mean. Returns `None` for empty input.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of an ascending-sorted slice. Returns `None` for empty input.
#[must_use]
pub fn median(sorted: &[f64]) -> Option<f64> {
    quantile(sorted, 0.5)
}

/// Sample standard deviation (ddof = 1). Returns `None` with fewer than
/// two values, where the deviation is undefined.
#[must_use]
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// IQR outlier fences `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]` of an
/// ascending-sorted slice. Returns `None` for empty input.
///
/// A zero IQR yields `lower == upper == Q1`, so every non-equal value
/// falls outside the fences. That is the intended behavior for
/// zero-variance columns, not an edge case to suppress.
#[must_use]
pub fn iqr_fences(sorted: &[f64]) -> Option<(f64, f64)> {
    let q1 = quantile(sorted, 0.25)?;
    let q3 = quantile(sorted, 0.75)?;
    let iqr = q3 - q1;
    Some((q1 - 1.5 * iqr, q3 + 1.5 * iqr))
}

/// Sorts values ascending with a total order (NaN-safe).
#[must_use]
pub fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values
}
