//! Pretrained per-column scalers, loaded from JSON artifacts and never fitted here.

pub mod aligner;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, ForecastResult};
use crate::features::FEATURE_COLUMNS;

pub use aligner::NormalizationAligner;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerParams {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`
    MinMax { scale: Vec<f64>, min: Vec<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedNormalization {
    /// Column names the scaler was fitted on, in fitted order. Older artifacts
    /// omit it; those are applied positionally to every column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(flatten)]
    pub params: ScalerParams,
}

impl FittedNormalization {
    pub fn standard(columns: Option<Vec<String>>, mean: Vec<f64>, scale: Vec<f64>) -> ForecastResult<Self> {
        let norm = Self {
            columns,
            params: ScalerParams::Standard { mean, scale },
        };
        norm.validate()?;
        Ok(norm)
    }

    pub fn min_max(columns: Option<Vec<String>>, scale: Vec<f64>, min: Vec<f64>) -> ForecastResult<Self> {
        let norm = Self {
            columns,
            params: ScalerParams::MinMax { scale, min },
        };
        norm.validate()?;
        Ok(norm)
    }

    pub fn from_json(s: &str) -> ForecastResult<Self> {
        let norm: Self = serde_json::from_str(s)?;
        norm.validate()?;
        Ok(norm)
    }

    /// Load an artifact. A missing file is `Ok(None)`; an unreadable or
    /// malformed one is an error.
    pub fn load(path: &Path) -> ForecastResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw).map(Some)
    }

    pub fn width(&self) -> usize {
        match &self.params {
            ScalerParams::Standard { mean, .. } => mean.len(),
            ScalerParams::MinMax { min, .. } => min.len(),
        }
    }

    pub fn declared_columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    fn validate(&self) -> ForecastResult<()> {
        let (a, b) = match &self.params {
            ScalerParams::Standard { mean, scale } => (mean.len(), scale.len()),
            ScalerParams::MinMax { scale, min } => (scale.len(), min.len()),
        };
        if a != b || a == 0 {
            return Err(ForecastError::Alignment(format!(
                "scaler parameter lengths differ or are empty ({} vs {})",
                a, b
            )));
        }
        if let Some(cols) = &self.columns {
            if cols.len() != a {
                return Err(ForecastError::Alignment(format!(
                    "scaler declares {} columns but has {} parameters",
                    cols.len(),
                    a
                )));
            }
        }
        Ok(())
    }

    /// Scale one value of fitted column `idx`.
    pub fn transform_value(&self, idx: usize, x: f64) -> f64 {
        match &self.params {
            ScalerParams::Standard { mean, scale } => (x - mean[idx]) / non_zero(scale[idx]),
            ScalerParams::MinMax { scale, min } => x * scale[idx] + min[idx],
        }
    }

    pub fn inverse_value(&self, idx: usize, y: f64) -> f64 {
        match &self.params {
            ScalerParams::Standard { mean, scale } => y * non_zero(scale[idx]) + mean[idx],
            ScalerParams::MinMax { scale, min } => (y - min[idx]) / non_zero(scale[idx]),
        }
    }

    /// Check the declared input columns against the feature schema, so a
    /// version skew is caught at load time rather than per request.
    pub fn validate_input_schema(&self) -> ForecastResult<()> {
        match &self.columns {
            Some(cols) => {
                let unknown: Vec<&str> = cols
                    .iter()
                    .map(String::as_str)
                    .filter(|c| !FEATURE_COLUMNS.contains(c))
                    .collect();
                if !unknown.is_empty() {
                    return Err(ForecastError::Alignment(format!(
                        "input normalization declares columns unknown to the feature schema: {}",
                        unknown.join(", ")
                    )));
                }
                Ok(())
            }
            None if self.width() == FEATURE_COLUMNS.len() => Ok(()),
            None => Err(ForecastError::Alignment(format!(
                "input normalization has {} columns and no names; schema has {}",
                self.width(),
                FEATURE_COLUMNS.len()
            ))),
        }
    }

    pub fn validate_output_schema(&self) -> ForecastResult<()> {
        if self.width() != 1 {
            return Err(ForecastError::Alignment(format!(
                "output normalization must have exactly one column, has {}",
                self.width()
            )));
        }
        Ok(())
    }
}

// fitted scalers store 1.0 for constant columns; guard artifacts that don't
fn non_zero(scale: f64) -> f64 {
    if scale == 0.0 {
        1.0
    } else {
        scale
    }
}
