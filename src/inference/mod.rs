pub mod onnx;

use std::sync::Arc;

use chrono::NaiveDate;
use ndarray::{Array3, Axis};

use crate::error::{ForecastError, ForecastResult};
use crate::features::{FeatureMatrix, MatrixWindow};
use crate::normalization::{FittedNormalization, NormalizationAligner};

pub use onnx::OnnxSequenceModel;

/// Opaque pretrained sequence model: one `(1, lookback, features)` batch in,
/// one scalar in normalized output space out.
///
/// Implementations must be safe to call from several requests at once,
/// serializing internally if the backend is not.
pub trait SequenceModel: Send + Sync {
    fn predict(&self, batch: Array3<f32>) -> ForecastResult<f32>;
}

/// Result of one single-step inference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inference {
    pub log_return: f64,
    pub base_price: f64,
    pub price: f64,
    pub base_date: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct SequenceInferenceEngine {
    model: Option<Arc<dyn SequenceModel>>,
    input_norm: Option<Arc<FittedNormalization>>,
    output_norm: Option<Arc<FittedNormalization>>,
    aligner: NormalizationAligner,
    lookback: usize,
}

impl SequenceInferenceEngine {
    pub fn new(
        model: Option<Arc<dyn SequenceModel>>,
        input_norm: Option<Arc<FittedNormalization>>,
        output_norm: Option<Arc<FittedNormalization>>,
        lookback: usize,
    ) -> Self {
        Self {
            model,
            input_norm,
            output_norm,
            aligner: NormalizationAligner,
            lookback: lookback.max(1),
        }
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn input_normalization_loaded(&self) -> bool {
        self.input_norm.is_some()
    }

    pub fn output_normalization_loaded(&self) -> bool {
        self.output_norm.is_some()
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some() && self.input_norm.is_some() && self.output_norm.is_some()
    }

    fn missing_artifacts(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.model.is_none() {
            missing.push("sequence model");
        }
        if self.input_norm.is_none() {
            missing.push("input normalization");
        }
        if self.output_norm.is_none() {
            missing.push("output normalization");
        }
        missing
    }

    /// `ModelUnavailable` naming every missing artifact, if any.
    pub fn ensure_ready(&self) -> ForecastResult<()> {
        self.ready_parts().map(|_| ())
    }

    fn ready_parts(
        &self,
    ) -> ForecastResult<(&dyn SequenceModel, &FittedNormalization, &FittedNormalization)> {
        match (&self.model, &self.input_norm, &self.output_norm) {
            (Some(model), Some(input), Some(output)) => Ok((model.as_ref(), input, output)),
            _ => Err(ForecastError::ModelUnavailable(format!(
                "not loaded: {}",
                self.missing_artifacts().join(", ")
            ))),
        }
    }

    /// Scale the feature matrix with the input normalization.
    pub fn align(&self, matrix: &FeatureMatrix) -> ForecastResult<FeatureMatrix> {
        let (_, input, _) = self.ready_parts()?;
        self.aligner.align(matrix, input)
    }

    /// Predict from the window of `lookback` aligned rows ending
    /// `offset_from_end` rows before the last one.
    ///
    /// The base price comes from the window's final row close, which is a
    /// real price even though the features around it are scaled.
    pub fn infer(&self, aligned: &FeatureMatrix, offset_from_end: usize) -> ForecastResult<Inference> {
        let (model, _, output) = self.ready_parts()?;
        let window = aligned.window(self.lookback, offset_from_end)?;
        let batch = to_batch(&window);
        let scaled = model.predict(batch)?;
        if !scaled.is_finite() {
            return Err(ForecastError::Inference(format!(
                "model returned non-finite output {}",
                scaled
            )));
        }
        let log_return = output.inverse_value(0, scaled as f64);
        Ok(Inference {
            log_return,
            base_price: window.base_close,
            price: window.base_close * log_return.exp(),
            base_date: window.end_date,
        })
    }
}

/// `(lookback, features)` -> `(1, lookback, features)` in f32.
fn to_batch(window: &MatrixWindow<'_>) -> Array3<f32> {
    window
        .values
        .mapv(|v| v as f32)
        .insert_axis(Axis(0))
}
