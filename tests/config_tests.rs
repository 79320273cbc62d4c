use quant_forecast::config::Config;
use quant_forecast::model::MacroInstrument;

const FULL_TOML: &str = r#"
[provider]
target_symbol = "PETR4.SA"
chart_base_url = "https://query1.finance.yahoo.com"
rate_base_url = "https://api.bcb.gov.br"
rate_series = 11
rate_is_daily = true
fallback_rate = 11.25
timeout_ms = 5000

[provider.macro_symbols]
usd_fx = "BRL=X"
brent = "BZ=F"
equity_index = "^BVSP"

[model]
model_id = "lstm-v1"
model_path = "models/lstm_model.onnx"
input_normalization_path = "models/input_scaler.json"
output_normalization_path = "models/output_scaler.json"
lookback = 20
input_name = "input"
heuristic_fallback = true

[features]
min_rows = 60
long_window = 200

[projection]
base_confidence = 0.6
decay_per_day = 0.02
floor_confidence = 0.45
max_horizon_days = 7

[monitoring]
shadow_enabled = false
shadow_error_window = 100

[logging]
level = "debug"
json = true
"#;

fn minimal_toml(lookback: usize) -> String {
    format!(
        r#"
[provider]
target_symbol = "PETR4.SA"
chart_base_url = "https://query1.finance.yahoo.com"
rate_base_url = "https://api.bcb.gov.br"
rate_series = 432
fallback_rate = 11.25
timeout_ms = 5000

[provider.macro_symbols]
usd_fx = "BRL=X"
brent = "BZ=F"
equity_index = "^BVSP"

[model]
model_id = "lstm-v1"
model_path = "models/lstm_model.onnx"
input_normalization_path = "models/input_scaler.json"
output_normalization_path = "models/output_scaler.json"
lookback = {}

[logging]
level = "info"
"#,
        lookback
    )
}

#[test]
fn parse_full_toml() {
    let config = Config::from_toml_str(FULL_TOML).unwrap();
    assert_eq!(config.provider.target_symbol, "PETR4.SA");
    assert_eq!(
        config.provider.macro_symbols.symbol(MacroInstrument::EquityIndex),
        "^BVSP"
    );
    assert!(config.provider.rate_is_daily);
    assert_eq!(config.provider.timeout().as_millis(), 5000);
    assert_eq!(config.model.lookback, 20);
    assert_eq!(config.model.input_name.as_deref(), Some("input"));
    assert!(config.model.heuristic_fallback);
    assert_eq!(config.features.min_rows, 60);
    assert_eq!(config.projection.max_horizon_days, 7);
    assert!((config.projection.floor_confidence - 0.45).abs() < f64::EPSILON);
    assert!(!config.monitoring.shadow_enabled);
    assert_eq!(config.monitoring.shadow_error_window, 100);
    assert!(config.logging.json);
}

#[test]
fn optional_sections_take_defaults() {
    let config = Config::from_toml_str(&minimal_toml(20)).unwrap();
    assert_eq!(config.features.min_rows, 50);
    assert_eq!(config.features.long_window, 200);
    assert!((config.projection.base_confidence - 0.55).abs() < f64::EPSILON);
    assert!((config.projection.decay_per_day - 0.03).abs() < f64::EPSILON);
    assert!((config.projection.floor_confidence - 0.40).abs() < f64::EPSILON);
    assert_eq!(config.projection.max_horizon_days, 5);
    assert!(config.monitoring.shadow_enabled);
    assert_eq!(config.monitoring.shadow_error_window, 250);
    assert!(!config.model.heuristic_fallback);
    assert!(!config.provider.rate_is_daily);
    assert!(config.model.input_name.is_none());
    assert!(!config.logging.json);
}

#[test]
fn zero_lookback_rejected() {
    assert!(Config::from_toml_str(&minimal_toml(0)).is_err());
}

#[test]
fn lookback_must_fit_in_min_rows() {
    let err = Config::from_toml_str(&minimal_toml(50)).unwrap_err();
    assert!(format!("{:#}", err).contains("min_rows"));
}

#[test]
fn inconsistent_projection_rejected() {
    let toml_str = format!(
        "{}\n[projection]\nbase_confidence = 0.3\ndecay_per_day = 0.03\nfloor_confidence = 0.4\nmax_horizon_days = 5\n",
        minimal_toml(20)
    );
    assert!(Config::from_toml_str(&toml_str).is_err());
}

#[test]
fn invalid_url_rejected() {
    let toml_str = minimal_toml(20).replace("https://api.bcb.gov.br", "not a url");
    let err = Config::from_toml_str(&toml_str).unwrap_err();
    assert!(format!("{:#}", err).contains("rate_base_url"));
}

#[test]
fn missing_section_is_parse_error() {
    let toml_str = minimal_toml(20).replace("[logging]\nlevel = \"info\"\n", "");
    assert!(Config::from_toml_str(&toml_str).is_err());
}

#[test]
fn load_from_file() {
    let path = std::env::temp_dir().join(format!("forecast-{}.toml", uuid::Uuid::new_v4()));
    std::fs::write(&path, FULL_TOML).unwrap();
    let config = Config::load_from(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(config.model.model_id, "lstm-v1");
}

#[test]
fn load_from_missing_file_fails() {
    let path = std::env::temp_dir().join(format!("absent-{}.toml", uuid::Uuid::new_v4()));
    let err = Config::load_from(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("failed to read"));
}
