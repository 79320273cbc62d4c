use ndarray::Array2;

/// Resolve undefined values column by column: forward-fill from the last
/// finite value, then zero-fill whatever leading gap remains.
///
/// Infinite values count as undefined. Idempotent.
pub fn forward_fill_then_zero(values: &mut Array2<f64>) {
    for mut column in values.columns_mut() {
        let mut last: Option<f64> = None;
        for v in column.iter_mut() {
            if v.is_finite() {
                last = Some(*v);
            } else {
                *v = last.unwrap_or(0.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn leading_gap_zero_filled_inner_gap_forward_filled() {
        let mut m = array![
            [f64::NAN, 1.0],
            [2.0, f64::INFINITY],
            [f64::NAN, 3.0],
        ];
        forward_fill_then_zero(&mut m);
        assert_eq!(m, array![[0.0, 1.0], [2.0, 1.0], [2.0, 3.0]]);
    }

    #[test]
    fn second_pass_changes_nothing() {
        let mut once = array![
            [f64::NAN, f64::NEG_INFINITY, 1.5],
            [4.0, f64::NAN, f64::NAN],
            [f64::NAN, 2.0, -0.0],
        ];
        forward_fill_then_zero(&mut once);
        assert_eq!(once, array![[0.0, 0.0, 1.5], [4.0, 0.0, 1.5], [4.0, 2.0, 0.0]]);

        let mut twice = once.clone();
        forward_fill_then_zero(&mut twice);
        assert!(once
            .iter()
            .zip(twice.iter())
            .all(|(a, b)| a.to_bits() == b.to_bits()));
    }
}
