use chrono::NaiveDate;
use ndarray::{array, Array2};
use quant_forecast::error::ForecastError;
use quant_forecast::features::{FeatureMatrix, FEATURE_COLUMNS};
use quant_forecast::normalization::{FittedNormalization, NormalizationAligner, ScalerParams};

fn matrix(columns: &[&str], values: Array2<f64>) -> FeatureMatrix {
    let rows = values.nrows();
    let dates = (0..rows)
        .map(|i| NaiveDate::from_ymd_opt(2024, 3, 4 + i as u32))
        .collect();
    FeatureMatrix::new(
        columns.iter().map(|c| c.to_string()).collect(),
        values,
        dates,
        vec![10.0; rows],
    )
    .unwrap()
}

#[test]
fn parses_standard_scaler_artifact() {
    let json = r#"{"kind":"standard","columns":["return_1","RSI_21"],"mean":[0.0,50.0],"scale":[0.02,10.0]}"#;
    let norm = FittedNormalization::from_json(json).unwrap();
    assert_eq!(norm.width(), 2);
    assert_eq!(norm.declared_columns().unwrap()[1], "RSI_21");
    assert!(matches!(norm.params, ScalerParams::Standard { .. }));
    assert!((norm.transform_value(1, 70.0) - 2.0).abs() < 1e-12);
    assert!((norm.inverse_value(1, 2.0) - 70.0).abs() < 1e-12);
}

#[test]
fn min_max_inverse_undoes_transform() {
    let norm = FittedNormalization::min_max(None, vec![0.5], vec![0.1]).unwrap();
    let y = norm.transform_value(0, 0.03);
    assert!((norm.inverse_value(0, y) - 0.03).abs() < 1e-12);
}

#[test]
fn rejects_mismatched_parameter_lengths() {
    let err = FittedNormalization::standard(None, vec![0.0, 1.0], vec![1.0]).unwrap_err();
    assert!(matches!(err, ForecastError::Alignment(_)));
    let err = FittedNormalization::from_json(
        r#"{"kind":"standard","columns":["a"],"mean":[0.0,1.0],"scale":[1.0,1.0]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, ForecastError::Alignment(_)));
}

#[test]
fn missing_artifact_loads_as_none() {
    let path = std::env::temp_dir().join(format!("missing-{}.json", uuid::Uuid::new_v4()));
    assert!(FittedNormalization::load(&path).unwrap().is_none());
}

#[test]
fn artifact_round_trips_through_file() {
    let path = std::env::temp_dir().join(format!("scaler-{}.json", uuid::Uuid::new_v4()));
    let norm = FittedNormalization::standard(
        Some(vec!["return_1".to_string()]),
        vec![0.001],
        vec![0.02],
    )
    .unwrap();
    std::fs::write(&path, serde_json::to_string(&norm).unwrap()).unwrap();
    let loaded = FittedNormalization::load(&path).unwrap().unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded, norm);
}

#[test]
fn input_schema_rejects_unknown_columns() {
    let norm = FittedNormalization::standard(
        Some(vec!["return_1".to_string(), "Gold_t-1".to_string()]),
        vec![0.0, 0.0],
        vec![1.0, 1.0],
    )
    .unwrap();
    let err = norm.validate_input_schema().unwrap_err();
    assert!(err.to_string().contains("Gold_t-1"));
}

#[test]
fn unnamed_input_schema_needs_full_width() {
    let full = FittedNormalization::standard(None, vec![0.0; 34], vec![1.0; 34]).unwrap();
    assert!(full.validate_input_schema().is_ok());
    let narrow = FittedNormalization::standard(None, vec![0.0; 30], vec![1.0; 30]).unwrap();
    assert!(narrow.validate_input_schema().is_err());
    assert!(narrow.validate_output_schema().is_err());
    let output = FittedNormalization::standard(None, vec![0.0], vec![0.01]).unwrap();
    assert!(output.validate_output_schema().is_ok());
}

#[test]
fn aligner_scales_only_declared_columns() {
    let m = matrix(
        &["return_1", "RSI_21", "DoW_sin"],
        array![[0.02, 60.0, 0.5], [0.04, 40.0, -0.5]],
    );
    let norm = FittedNormalization::standard(
        Some(vec!["RSI_21".to_string(), "return_1".to_string()]),
        vec![50.0, 0.0],
        vec![10.0, 0.02],
    )
    .unwrap();
    let aligned = NormalizationAligner.align(&m, &norm).unwrap();
    assert_eq!(aligned.columns(), m.columns());
    assert!((aligned.value(0, "return_1").unwrap() - 1.0).abs() < 1e-12);
    assert!((aligned.value(1, "RSI_21").unwrap() + 1.0).abs() < 1e-12);
    // undeclared column copied bit-for-bit
    assert_eq!(
        aligned.value(1, "DoW_sin").unwrap().to_bits(),
        (-0.5f64).to_bits()
    );
    assert_eq!(aligned.closes(), m.closes());
    assert_eq!(aligned.dates(), m.dates());
}

#[test]
fn aligner_tolerates_partial_overlap() {
    let m = matrix(&["return_1", "DoW_sin"], array![[0.02, 0.5]]);
    let norm = FittedNormalization::standard(
        Some(vec!["return_1".to_string(), "OBV".to_string()]),
        vec![0.0, 0.0],
        vec![0.02, 1.0],
    )
    .unwrap();
    let aligned = NormalizationAligner.align(&m, &norm).unwrap();
    assert!((aligned.value(0, "return_1").unwrap() - 1.0).abs() < 1e-12);
}

#[test]
fn aligner_rejects_disjoint_columns() {
    let m = matrix(&["return_1"], array![[0.02]]);
    let norm =
        FittedNormalization::standard(Some(vec!["OBV".to_string()]), vec![0.0], vec![1.0]).unwrap();
    let err = NormalizationAligner.align(&m, &norm).unwrap_err();
    assert!(matches!(err, ForecastError::Alignment(_)));
}

#[test]
fn unnamed_normalization_is_positional() {
    let cols: Vec<&str> = FEATURE_COLUMNS.to_vec();
    let m = matrix(&cols, Array2::from_elem((2, 34), 3.0));
    let norm = FittedNormalization::standard(None, vec![1.0; 34], vec![2.0; 34]).unwrap();
    let aligned = NormalizationAligner.align(&m, &norm).unwrap();
    assert!(aligned.values().iter().all(|v| (*v - 1.0).abs() < 1e-12));

    let narrow = FittedNormalization::standard(None, vec![0.0; 33], vec![1.0; 33]).unwrap();
    assert!(NormalizationAligner.align(&m, &narrow).is_err());
}
