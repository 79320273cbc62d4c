//! Trend-hold projection of a single-step forecast across a short horizon.
//!
//! The one inferred log-return is applied as a constant daily growth factor.
//! Re-inferring each day would need exogenous features for future dates,
//! which are not known.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Deserialize;

use crate::error::{ForecastError, ForecastResult};
use crate::model::forecast::ForecastItem;

/// Heuristic confidence schedule; not statistically calibrated.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectionConfig {
    pub base_confidence: f64,
    pub decay_per_day: f64,
    pub floor_confidence: f64,
    pub max_horizon_days: u32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            base_confidence: 0.55,
            decay_per_day: 0.03,
            floor_confidence: 0.40,
            max_horizon_days: 5,
        }
    }
}

impl ProjectionConfig {
    pub fn validate(&self) -> ForecastResult<()> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.base_confidence) || !in_unit(self.floor_confidence) {
            return Err(ForecastError::Config(
                "projection confidences must be within [0, 1]".to_string(),
            ));
        }
        if self.floor_confidence > self.base_confidence {
            return Err(ForecastError::Config(
                "projection.floor_confidence must not exceed base_confidence".to_string(),
            ));
        }
        if self.decay_per_day < 0.0 || !self.decay_per_day.is_finite() {
            return Err(ForecastError::Config(
                "projection.decay_per_day must be a non-negative number".to_string(),
            ));
        }
        if self.max_horizon_days == 0 {
            return Err(ForecastError::Config(
                "projection.max_horizon_days must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ForecastProjector {
    config: ProjectionConfig,
}

impl ForecastProjector {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Confidence for horizon day `day` (1-indexed).
    pub fn confidence(&self, day: u32) -> f64 {
        let decayed =
            self.config.base_confidence - (day.saturating_sub(1)) as f64 * self.config.decay_per_day;
        decayed.max(self.config.floor_confidence)
    }

    pub fn project(
        &self,
        log_return: f64,
        base_price: f64,
        base_date: NaiveDate,
        horizon_days: u32,
    ) -> ForecastResult<Vec<ForecastItem>> {
        if horizon_days == 0 || horizon_days > self.config.max_horizon_days {
            return Err(ForecastError::InvalidHorizon {
                requested: horizon_days,
                max: self.config.max_horizon_days,
            });
        }
        let factor = log_return.exp();
        let mut price = base_price;
        let mut date = base_date;
        let mut items = Vec::with_capacity(horizon_days as usize);
        for day in 1..=horizon_days {
            price *= factor;
            date = next_trading_day(date);
            items.push(ForecastItem {
                date,
                price,
                confidence: self.confidence(day),
            });
        }
        Ok(items)
    }
}

/// Next calendar day, pushed forward past Saturday/Sunday. Holidays are not
/// modelled.
pub fn next_trading_day(date: NaiveDate) -> NaiveDate {
    skip_weekend(date + Days::new(1))
}

/// Map a weekend date to the following Monday; weekdays are unchanged.
pub fn skip_weekend(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date + Days::new(2),
        Weekday::Sun => date + Days::new(1),
        _ => date,
    }
}
