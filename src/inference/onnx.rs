use std::path::Path;
use std::sync::Mutex;

use ndarray::Array3;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;

use crate::error::{ForecastError, ForecastResult};

use super::SequenceModel;

/// Sequence model exported to ONNX.
///
/// An ONNX Runtime session needs exclusive access to run, so calls are
/// serialized behind a mutex scoped to this handle.
pub struct OnnxSequenceModel {
    session: Mutex<Session>,
    input_name: Option<String>,
}

impl OnnxSequenceModel {
    /// Load the model. A missing file is `Ok(None)`.
    pub fn load(path: &Path, input_name: Option<String>) -> ForecastResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(1))
            .and_then(|b| b.commit_from_file(path))
            .map_err(|e| {
                ForecastError::Inference(format!(
                    "failed to load ONNX model {}: {}",
                    path.display(),
                    e
                ))
            })?;
        Ok(Some(Self {
            session: Mutex::new(session),
            input_name,
        }))
    }
}

impl SequenceModel for OnnxSequenceModel {
    fn predict(&self, batch: Array3<f32>) -> ForecastResult<f32> {
        let shape = batch.shape().to_vec();
        let tensor = Tensor::from_array(batch)
            .map_err(|e| ForecastError::Inference(format!("input tensor {:?}: {}", shape, e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ForecastError::Inference("model session lock poisoned".to_string()))?;
        let outputs = match &self.input_name {
            Some(name) => session.run(ort::inputs![name.as_str() => tensor]),
            None => session.run(ort::inputs![tensor]),
        }
        .map_err(|e| ForecastError::Inference(format!("session run failed: {}", e)))?;

        let (_, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ForecastError::Inference(format!("output extraction failed: {}", e)))?;
        data.first()
            .copied()
            .ok_or_else(|| ForecastError::Inference("model returned an empty output".to_string()))
    }
}
