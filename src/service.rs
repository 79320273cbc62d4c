//! Prediction orchestration: provider -> features -> alignment -> inference
//! -> projection, with shadow validation on the side.

use std::sync::{Arc, RwLock};

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::config::{Config, ModelConfig};
use crate::context::market_context;
use crate::error::{ForecastError, ForecastResult};
use crate::features::{FeatureEngineer, SCHEMA_VERSION};
use crate::inference::{OnnxSequenceModel, SequenceInferenceEngine, SequenceModel};
use crate::model::forecast::{
    Direction, ForecastItem, PredictionMode, PredictionRequest, PredictionResponse,
};
use crate::model::series::RawSeries;
use crate::monitoring::{MonitoringSample, MonitoringSink};
use crate::normalization::FittedNormalization;
use crate::projection::ForecastProjector;
use crate::provider::{fetch_with_timeout, MarketSeriesProvider};
use crate::shadow::ShadowValidator;

pub const HEURISTIC_MODEL_ID: &str = "heuristic-drift";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub model_loaded: bool,
    pub input_normalization_loaded: bool,
    pub output_normalization_loaded: bool,
    pub heuristic_fallback: bool,
    pub schema_version: &'static str,
}

impl HealthReport {
    pub fn ready(&self) -> bool {
        self.model_loaded && self.input_normalization_loaded && self.output_normalization_loaded
    }
}

/// Load the three artifacts independently.
///
/// A missing artifact leaves a gap (the engine then reports
/// `ModelUnavailable`), as does a model the runtime refuses to load. A
/// malformed normalization, or one that disagrees with the feature schema,
/// is an error.
pub fn load_artifacts(cfg: &ModelConfig) -> ForecastResult<SequenceInferenceEngine> {
    let model: Option<Arc<dyn SequenceModel>> =
        match OnnxSequenceModel::load(&cfg.model_path, cfg.input_name.clone()) {
            Ok(Some(m)) => {
                tracing::info!(path = %cfg.model_path.display(), "sequence model loaded");
                Some(Arc::new(m))
            }
            Ok(None) => {
                tracing::warn!(path = %cfg.model_path.display(), "sequence model not found");
                None
            }
            Err(e) => {
                tracing::error!(path = %cfg.model_path.display(), error = %e, "sequence model failed to load");
                None
            }
        };

    let input_norm = load_normalization(&cfg.input_normalization_path, "input")?;
    if let Some(norm) = &input_norm {
        norm.validate_input_schema()?;
    }
    let output_norm = load_normalization(&cfg.output_normalization_path, "output")?;
    if let Some(norm) = &output_norm {
        norm.validate_output_schema()?;
    }

    Ok(SequenceInferenceEngine::new(
        model,
        input_norm.map(Arc::new),
        output_norm.map(Arc::new),
        cfg.lookback,
    ))
}

fn load_normalization(
    path: &std::path::Path,
    role: &'static str,
) -> ForecastResult<Option<FittedNormalization>> {
    match FittedNormalization::load(path) {
        Ok(Some(norm)) => {
            tracing::info!(
                role,
                path = %path.display(),
                columns = norm.width(),
                named = norm.declared_columns().is_some(),
                "normalization loaded"
            );
            Ok(Some(norm))
        }
        Ok(None) => {
            tracing::warn!(role, path = %path.display(), "normalization not found");
            Ok(None)
        }
        Err(e) => {
            tracing::error!(role, path = %path.display(), error = %e, "normalization failed to load");
            Err(e)
        }
    }
}

/// Mean one-day log-return of the last `lookback` real closes.
pub fn heuristic_log_return(closes: &[f64], lookback: usize) -> f64 {
    let real: Vec<f64> = closes.iter().copied().filter(|c| *c > 0.0).collect();
    let tail = &real[real.len().saturating_sub(lookback + 1)..];
    if tail.len() < 2 {
        return 0.0;
    }
    let sum: f64 = tail.windows(2).map(|w| (w[1] / w[0]).ln()).sum();
    sum / (tail.len() - 1) as f64
}

pub struct ForecastService<P: MarketSeriesProvider> {
    config: Config,
    provider: P,
    engineer: FeatureEngineer,
    projector: ForecastProjector,
    shadow: ShadowValidator,
    sink: Arc<dyn MonitoringSink>,
    engine: RwLock<Arc<SequenceInferenceEngine>>,
}

impl<P: MarketSeriesProvider> ForecastService<P> {
    /// Build the service and load artifacts from the configured paths.
    pub fn load(config: Config, provider: P, sink: Arc<dyn MonitoringSink>) -> ForecastResult<Self> {
        let engine = load_artifacts(&config.model)?;
        Ok(Self::with_engine(config, provider, sink, engine))
    }

    pub fn with_engine(
        config: Config,
        provider: P,
        sink: Arc<dyn MonitoringSink>,
        engine: SequenceInferenceEngine,
    ) -> Self {
        Self {
            engineer: FeatureEngineer::new(config.features.clone()),
            projector: ForecastProjector::new(config.projection.clone()),
            shadow: ShadowValidator,
            config,
            provider,
            sink,
            engine: RwLock::new(Arc::new(engine)),
        }
    }

    fn engine(&self) -> Arc<SequenceInferenceEngine> {
        match self.engine.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Re-read all artifacts; in-flight requests keep the engine they started with.
    pub fn reload(&self) -> ForecastResult<HealthReport> {
        let engine = Arc::new(load_artifacts(&self.config.model)?);
        match self.engine.write() {
            Ok(mut guard) => *guard = engine,
            Err(poisoned) => *poisoned.into_inner() = engine,
        }
        Ok(self.health())
    }

    pub fn health(&self) -> HealthReport {
        let engine = self.engine();
        HealthReport {
            model_loaded: engine.model_loaded(),
            input_normalization_loaded: engine.input_normalization_loaded(),
            output_normalization_loaded: engine.output_normalization_loaded(),
            heuristic_fallback: self.config.model.heuristic_fallback,
            schema_version: SCHEMA_VERSION,
        }
    }

    /// Fetch market data, degrading to the fallback dataset on failure.
    async fn market_series(&self) -> (RawSeries, bool) {
        let trading_days = self.engineer.required_history(self.config.model.lookback);
        match fetch_with_timeout(&self.provider, trading_days, self.config.provider.timeout()).await
        {
            Ok(raw) => (raw, false),
            Err(e) => {
                tracing::warn!(error = %e, "market data unavailable, using fallback dataset");
                let raw = RawSeries::fallback(
                    Utc::now().date_naive(),
                    self.config.features.min_rows,
                    self.config.provider.fallback_rate,
                );
                (raw, true)
            }
        }
    }

    pub async fn predict(&self, request: PredictionRequest) -> ForecastResult<PredictionResponse> {
        let max = self.projector.config().max_horizon_days;
        if request.horizon_days == 0 || request.horizon_days > max {
            return Err(ForecastError::InvalidHorizon {
                requested: request.horizon_days,
                max,
            });
        }

        let engine = self.engine();
        let heuristic = !engine.is_ready();
        if heuristic && !self.config.model.heuristic_fallback {
            engine.ensure_ready()?;
        }

        let (raw, data_degraded) = self.market_series().await;
        let features = self.engineer.build(&raw)?;
        let market = market_context(
            &raw,
            &features,
            self.config.features.long_window,
            self.config.provider.rate_is_daily,
        );

        let (mode, log_return, base_price, base_date) = if heuristic {
            tracing::warn!("artifacts missing, serving heuristic forecast");
            let closes = features.closes();
            (
                PredictionMode::Heuristic,
                heuristic_log_return(closes, engine.lookback()),
                closes.last().copied().unwrap_or(0.0),
                features.last_date(),
            )
        } else {
            let aligned = engine.align(&features)?;
            let inference = engine.infer(&aligned, 0).map_err(|e| {
                tracing::error!(
                    error = %e,
                    rows = aligned.n_rows(),
                    columns = aligned.n_cols(),
                    lookback = engine.lookback(),
                    last_date = ?aligned.last_date(),
                    "inference failed"
                );
                e
            })?;
            if self.config.monitoring.shadow_enabled {
                self.shadow
                    .run_best_effort(&engine, &aligned, self.sink.as_ref());
            }
            (
                PredictionMode::Model,
                inference.log_return,
                inference.base_price,
                inference.base_date,
            )
        };

        let base_date = base_date.unwrap_or_else(|| Utc::now().date_naive());
        let items = self
            .projector
            .project(log_return, base_price, base_date, request.horizon_days)?;
        let direction = Direction::from_log_return(log_return);
        self.emit_samples(base_price, direction, &items);

        let model_id = match mode {
            PredictionMode::Model => self.config.model.model_id.clone(),
            PredictionMode::Heuristic => HEURISTIC_MODEL_ID.to_string(),
        };
        tracing::info!(
            model_id = %model_id,
            mode = ?mode,
            data_degraded,
            log_return,
            base_price,
            horizon = request.horizon_days,
            "prediction served"
        );

        Ok(PredictionResponse {
            request_id: Uuid::new_v4(),
            model_id,
            generated_at: Utc::now(),
            mode,
            data_degraded,
            predicted_log_return: log_return,
            direction,
            market,
            forecasts: items.iter().map(ForecastItem::rounded).collect(),
        })
    }

    fn emit_samples(&self, base_price: f64, direction: Direction, items: &[ForecastItem]) {
        self.sink.emit(MonitoringSample::InputPrice(base_price));
        for (i, item) in items.iter().enumerate() {
            self.sink.emit(MonitoringSample::PredictedPrice {
                day: i as u32 + 1,
                price: item.price,
            });
        }
        if let Some(last) = items.last() {
            self.sink.emit(MonitoringSample::LastConfidence(last.confidence));
        }
        self.sink.emit(MonitoringSample::Direction(direction));
    }
}
