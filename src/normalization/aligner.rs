use crate::error::{ForecastError, ForecastResult};
use crate::features::FeatureMatrix;

use super::FittedNormalization;

/// Applies a fitted normalization to exactly the columns it was fitted on.
///
/// Columns outside the declared set (e.g. already-bounded calendar encodings)
/// are copied through bit-for-bit.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizationAligner;

impl NormalizationAligner {
    pub fn align(
        &self,
        matrix: &FeatureMatrix,
        norm: &FittedNormalization,
    ) -> ForecastResult<FeatureMatrix> {
        let pairs = self.column_pairs(matrix, norm)?;
        let mut values = matrix.values().to_owned();
        for (fitted_idx, matrix_idx) in pairs {
            values
                .column_mut(matrix_idx)
                .mapv_inplace(|x| norm.transform_value(fitted_idx, x));
        }
        matrix.with_values(values)
    }

    /// `(fitted column index, matrix column index)` for every column to scale.
    fn column_pairs(
        &self,
        matrix: &FeatureMatrix,
        norm: &FittedNormalization,
    ) -> ForecastResult<Vec<(usize, usize)>> {
        let Some(declared) = norm.declared_columns() else {
            if norm.width() != matrix.n_cols() {
                return Err(ForecastError::Alignment(format!(
                    "unnamed normalization has {} columns, matrix has {}",
                    norm.width(),
                    matrix.n_cols()
                )));
            }
            tracing::debug!(
                columns = matrix.n_cols(),
                "normalization has no column names; scaling every column"
            );
            return Ok((0..matrix.n_cols()).map(|i| (i, i)).collect());
        };

        let pairs: Vec<(usize, usize)> = declared
            .iter()
            .enumerate()
            .filter_map(|(k, name)| matrix.column_position(name).map(|j| (k, j)))
            .collect();
        if pairs.is_empty() {
            return Err(ForecastError::Alignment(format!(
                "none of the {} declared normalization columns exist in the feature matrix",
                declared.len()
            )));
        }
        if pairs.len() < declared.len() {
            tracing::warn!(
                declared = declared.len(),
                matched = pairs.len(),
                "some declared normalization columns are missing from the feature matrix"
            );
        }
        Ok(pairs)
    }
}
