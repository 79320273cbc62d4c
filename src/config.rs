use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::features::FeatureConfig;
use crate::monitoring::MonitoringConfig;
use crate::projection::ProjectionConfig;
use crate::provider::ProviderConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const CONFIG_PATH_ENV: &str = "FORECAST_CONFIG";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub provider: ProviderConfig,
    pub model: ModelConfig,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub projection: ProjectionConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub model_id: String,
    pub model_path: PathBuf,
    pub input_normalization_path: PathBuf,
    pub output_normalization_path: PathBuf,
    pub lookback: usize,
    /// ONNX input name; the first model input when unset.
    #[serde(default)]
    pub input_name: Option<String>,
    /// Serve a drift-based estimate when artifacts are missing.
    #[serde(default)]
    pub heuristic_fallback: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Config {
    /// Read `.env`, then the TOML file named by `FORECAST_CONFIG` or
    /// `config/default.toml`.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("invalid config in {}", config_path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).context("failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.lookback == 0 {
            bail!("model.lookback must be > 0");
        }
        if self.model.model_id.trim().is_empty() {
            bail!("model.model_id must not be empty");
        }
        if self.features.min_rows < self.model.lookback + 1 {
            bail!(
                "features.min_rows ({}) must exceed model.lookback ({})",
                self.features.min_rows,
                self.model.lookback
            );
        }
        if self.features.long_window == 0 {
            bail!("features.long_window must be > 0");
        }
        self.projection
            .validate()
            .context("projection section is invalid")?;
        for (key, value) in [
            ("provider.chart_base_url", &self.provider.chart_base_url),
            ("provider.rate_base_url", &self.provider.rate_base_url),
        ] {
            url::Url::parse(value).with_context(|| format!("{} is not a valid URL", key))?;
        }
        if self.provider.target_symbol.trim().is_empty() {
            bail!("provider.target_symbol must not be empty");
        }
        Ok(())
    }
}
