use crate::error::{ForecastError, ForecastResult};
use crate::features::FeatureMatrix;
use crate::inference::SequenceInferenceEngine;
use crate::model::forecast::ShadowResult;
use crate::monitoring::{MonitoringSample, MonitoringSink};

/// Scores the model against the latest realized close by predicting it from
/// the window that ends one row earlier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShadowValidator;

impl ShadowValidator {
    pub fn validate(
        &self,
        engine: &SequenceInferenceEngine,
        aligned: &FeatureMatrix,
    ) -> ForecastResult<ShadowResult> {
        let last = aligned.n_rows().checked_sub(1).ok_or(ForecastError::InsufficientHistory {
            required: engine.lookback() + 1,
            available: 0,
        })?;
        if aligned.is_padded(last) {
            return Err(ForecastError::DataUnavailable(
                "latest row is padding; no realized close".to_string(),
            ));
        }
        let realized = aligned.closes()[last];
        if realized <= 0.0 {
            return Err(ForecastError::DataUnavailable(
                "latest realized close is not a trading price".to_string(),
            ));
        }
        let inference = engine.infer(aligned, 1)?;
        Ok(ShadowResult::new(realized, inference.price))
    }

    /// Run [`Self::validate`] without letting its failure escape; a success is
    /// emitted to `sink`.
    pub fn run_best_effort(
        &self,
        engine: &SequenceInferenceEngine,
        aligned: &FeatureMatrix,
        sink: &dyn MonitoringSink,
    ) -> Option<ShadowResult> {
        match self.validate(engine, aligned) {
            Ok(result) => {
                sink.emit(MonitoringSample::ShadowError {
                    absolute: result.absolute_error,
                    relative: result.relative_error,
                });
                Some(result)
            }
            Err(e) => {
                tracing::debug!(error = %e, "shadow validation skipped");
                None
            }
        }
    }
}
