use std::sync::{Arc, Mutex};

use chrono::{Days, NaiveDate};
use ndarray::{Array2, Array3};
use quant_forecast::error::{ForecastError, ForecastResult};
use quant_forecast::features::{FeatureMatrix, FEATURE_COLUMNS};
use quant_forecast::inference::{SequenceInferenceEngine, SequenceModel};
use quant_forecast::monitoring::{MonitoringSample, MonitoringSink};
use quant_forecast::normalization::FittedNormalization;
use quant_forecast::shadow::ShadowValidator;

struct FlatModel;

impl SequenceModel for FlatModel {
    fn predict(&self, _batch: Array3<f32>) -> ForecastResult<f32> {
        Ok(0.0)
    }
}

#[derive(Default)]
struct RecordingSink {
    samples: Mutex<Vec<MonitoringSample>>,
}

impl MonitoringSink for RecordingSink {
    fn emit(&self, sample: MonitoringSample) {
        self.samples.lock().unwrap().push(sample);
    }
}

fn engine(lookback: usize) -> SequenceInferenceEngine {
    SequenceInferenceEngine::new(
        Some(Arc::new(FlatModel) as Arc<dyn SequenceModel>),
        Some(Arc::new(
            FittedNormalization::standard(None, vec![0.0; 34], vec![1.0; 34]).unwrap(),
        )),
        Some(Arc::new(
            FittedNormalization::standard(None, vec![0.0], vec![0.01]).unwrap(),
        )),
        lookback,
    )
}

fn matrix(closes: Vec<f64>) -> FeatureMatrix {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let rows = closes.len();
    let dates = closes
        .iter()
        .enumerate()
        .map(|(i, c)| (*c > 0.0).then(|| start + Days::new(i as u64)))
        .collect();
    FeatureMatrix::new(
        FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        Array2::zeros((rows, FEATURE_COLUMNS.len())),
        dates,
        closes,
    )
    .unwrap()
}

#[test]
fn scores_previous_window_against_last_close() {
    let closes: Vec<f64> = (0..60).map(|i| 30.0 + i as f64).collect();
    let result = ShadowValidator.validate(&engine(20), &matrix(closes)).unwrap();
    assert!((result.realized_price - 89.0).abs() < 1e-12);
    assert!((result.predicted_price - 88.0).abs() < 1e-9);
    assert!((result.absolute_error - 1.0).abs() < 1e-9);
    assert!((result.relative_error - 1.0 / 89.0).abs() < 1e-9);
}

#[test]
fn needs_one_row_beyond_lookback() {
    let closes: Vec<f64> = (0..20).map(|i| 30.0 + i as f64).collect();
    let err = ShadowValidator.validate(&engine(20), &matrix(closes)).unwrap_err();
    assert!(matches!(
        err,
        ForecastError::InsufficientHistory { required: 21, .. }
    ));
}

#[test]
fn zero_realized_close_is_unavailable() {
    let mut closes: Vec<f64> = (0..60).map(|i| 30.0 + i as f64).collect();
    *closes.last_mut().unwrap() = 0.0;
    let err = ShadowValidator.validate(&engine(20), &matrix(closes)).unwrap_err();
    assert!(matches!(err, ForecastError::DataUnavailable(_)));
}

#[test]
fn best_effort_emits_error_sample() {
    let sink = RecordingSink::default();
    let closes: Vec<f64> = (0..60).map(|i| 30.0 + i as f64).collect();
    let result = ShadowValidator.run_best_effort(&engine(20), &matrix(closes), &sink);
    assert!(result.is_some());
    let samples = sink.samples.lock().unwrap();
    assert_eq!(samples.len(), 1);
    assert!(matches!(samples[0], MonitoringSample::ShadowError { .. }));
}

#[test]
fn best_effort_swallows_failure() {
    let sink = RecordingSink::default();
    let not_ready = SequenceInferenceEngine::new(None, None, None, 20);
    let closes: Vec<f64> = (0..60).map(|i| 30.0 + i as f64).collect();
    assert!(ShadowValidator
        .run_best_effort(&not_ready, &matrix(closes), &sink)
        .is_none());
    assert!(sink.samples.lock().unwrap().is_empty());
}
