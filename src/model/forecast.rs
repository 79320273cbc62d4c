use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One projected trading day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastItem {
    pub date: NaiveDate,
    pub price: f64,
    /// In [0, 1].
    pub confidence: f64,
}

impl ForecastItem {
    /// Copy with price and confidence rounded to two decimals for display.
    pub fn rounded(&self) -> Self {
        Self {
            date: self.date,
            price: round2(self.price),
            confidence: round2(self.confidence),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub horizon_days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn from_log_return(r: f64) -> Self {
        if r > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

/// How the single-step return behind a response was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionMode {
    Model,
    Heuristic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Undefined,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroFigures {
    pub usd_fx: f64,
    pub brent: f64,
    pub equity_index: f64,
    /// Annual percentage.
    pub reference_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalFigures {
    pub rsi: f64,
    pub macd: f64,
    pub atr: f64,
    pub vwap: f64,
    pub sma200_trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    pub current_price: f64,
    pub reference_date: Option<NaiveDate>,
    pub macro_figures: MacroFigures,
    pub technicals: TechnicalFigures,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub request_id: Uuid,
    pub model_id: String,
    pub generated_at: DateTime<Utc>,
    pub mode: PredictionMode,
    pub data_degraded: bool,
    pub predicted_log_return: f64,
    pub direction: Direction,
    pub market: MarketContext,
    pub forecasts: Vec<ForecastItem>,
}

/// Score of a back-shifted prediction against an already realized close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowResult {
    pub realized_price: f64,
    pub predicted_price: f64,
    pub absolute_error: f64,
    pub relative_error: f64,
}

impl ShadowResult {
    pub fn new(realized_price: f64, predicted_price: f64) -> Self {
        let absolute_error = (predicted_price - realized_price).abs();
        let relative_error = if realized_price.abs() > f64::EPSILON {
            absolute_error / realized_price.abs()
        } else {
            f64::NAN
        };
        Self {
            realized_price,
            predicted_price,
            absolute_error,
            relative_error,
        }
    }
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
