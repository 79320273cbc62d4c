//! NaN-aware element-wise helpers over aligned daily series.
//!
//! Undefined values are represented as NaN throughout; the fill policy in
//! [`super::fill`] resolves them once the whole matrix is assembled.

/// Division with a zero denominator mapped to NaN instead of infinity.
pub fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 || !den.is_finite() || !num.is_finite() {
        f64::NAN
    } else {
        num / den
    }
}

/// Value `periods` rows earlier; the first `periods` rows are NaN.
pub fn shift(values: &[f64], periods: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if periods < n {
        out[periods..].copy_from_slice(&values[..n - periods]);
    }
    out
}

/// Simple percentage change against the value `periods` rows earlier.
pub fn pct_change(values: &[f64], periods: usize) -> Vec<f64> {
    let lagged = shift(values, periods);
    values
        .iter()
        .zip(lagged.iter())
        .map(|(cur, prev)| safe_div(cur - prev, *prev))
        .collect()
}

/// `value - value[periods rows earlier]`.
pub fn diff(values: &[f64], periods: usize) -> Vec<f64> {
    let lagged = shift(values, periods);
    values
        .iter()
        .zip(lagged.iter())
        .map(|(cur, prev)| cur - prev)
        .collect()
}

/// Running sum treating undefined entries as zero.
pub fn cumsum(values: &[f64]) -> Vec<f64> {
    let mut acc = 0.0;
    values
        .iter()
        .map(|v| {
            if v.is_finite() {
                acc += v;
            }
            acc
        })
        .collect()
}

pub fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else if v == 0.0 {
        0.0
    } else {
        f64::NAN
    }
}
