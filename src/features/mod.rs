//! Raw daily series to the fixed, ordered model feature matrix.
//!
//! Exogenous macro series are lagged one row so a row never carries
//! same-day information about them. Everything else is computed from the
//! target instrument's own bars up to and including the row's date.

pub mod fill;
pub mod ops;
pub mod schema;

use chrono::{Datelike, NaiveDate};
use ndarray::Array2;
use serde::Deserialize;

use crate::error::ForecastResult;
use crate::indicator::{Atr, Ema, RollingStd, Rsi, Sma};
use crate::model::series::{MacroInstrument, RawSeries};

use self::ops::{cumsum, diff, pct_change, safe_div, shift, sign};
pub use self::schema::{FeatureMatrix, MatrixWindow, FEATURE_COLUMNS, SCHEMA_VERSION};

const RSI_PERIOD: usize = 21;
const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;
const ATR_PERIOD: usize = 14;
const BB_PERIOD: usize = 20;
const BB_MULT: f64 = 2.0;
const VOLUME_PERIOD: usize = 20;
const TRADING_WEEK: f64 = 5.0;
const MONTHS: f64 = 12.0;

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureConfig {
    /// Resolved matrices shorter than this are left-padded with zero rows.
    pub min_rows: usize,
    /// Long simple moving average window used for `Dist_SMA200`.
    pub long_window: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            min_rows: 50,
            long_window: 200,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeatureEngineer {
    config: FeatureConfig,
}

impl FeatureEngineer {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Trading days a caller should fetch so the longest window is warm at
    /// the start of the last `lookback` rows.
    pub fn required_history(&self, lookback: usize) -> usize {
        lookback + self.config.long_window + self.config.min_rows
    }

    /// Build the resolved matrix: every column present, no undefined values,
    /// one row per input bar, left-padded up to `min_rows`.
    pub fn build(&self, raw: &RawSeries) -> ForecastResult<FeatureMatrix> {
        let columns = self.compute_columns(raw);
        let n = raw.len();

        let mut values = Array2::<f64>::from_elem((n, columns.len()), f64::NAN);
        for (j, (_, col)) in columns.iter().enumerate() {
            for (i, v) in col.iter().enumerate() {
                values[[i, j]] = *v;
            }
        }
        fill::forward_fill_then_zero(&mut values);

        let mut dates: Vec<Option<NaiveDate>> = raw.bars.iter().map(|b| Some(b.date)).collect();
        let mut closes = raw.closes();

        let pad = self.config.min_rows.saturating_sub(n);
        if pad > 0 {
            tracing::debug!(rows = n, pad, "left-padding short feature matrix");
            let mut padded = Array2::<f64>::zeros((pad + n, columns.len()));
            padded.slice_mut(ndarray::s![pad.., ..]).assign(&values);
            values = padded;
            let mut padded_dates = vec![None; pad];
            padded_dates.append(&mut dates);
            dates = padded_dates;
            let mut padded_closes = vec![0.0; pad];
            padded_closes.append(&mut closes);
            closes = padded_closes;
        }

        FeatureMatrix::new(
            columns.iter().map(|(name, _)| name.to_string()).collect(),
            values,
            dates,
            closes,
        )
    }

    /// Raw, unfilled feature columns in schema order.
    fn compute_columns(&self, raw: &RawSeries) -> Vec<(&'static str, Vec<f64>)> {
        let n = raw.len();
        let close = raw.closes();
        let high: Vec<f64> = raw.bars.iter().map(|b| b.high).collect();
        let low: Vec<f64> = raw.bars.iter().map(|b| b.low).collect();
        let volume: Vec<f64> = raw.bars.iter().map(|b| b.volume).collect();

        let usd = raw.macro_aligned(MacroInstrument::UsdFx);
        let brent = raw.macro_aligned(MacroInstrument::Brent);
        let index = raw.macro_aligned(MacroInstrument::EquityIndex);
        let rate = raw.rate_aligned();

        let mut out: Vec<(&'static str, Vec<f64>)> = Vec::with_capacity(FEATURE_COLUMNS.len());

        out.push(("USDBRL_t-1", shift(&usd, 1)));
        out.push(("Brent_t-1", shift(&brent, 1)));
        out.push(("Ibovespa_t-1", shift(&index, 1)));
        out.push(("Selic_t-1", shift(&rate, 1)));
        out.push(("Ibov_Return_t-1", shift(&pct_change(&index, 1), 1)));
        out.push(("Brent_Return_t-1", shift(&pct_change(&brent, 1), 1)));
        out.push(("USD_Return_t-1", shift(&pct_change(&usd, 1), 1)));

        out.push(("return_1", pct_change(&close, 1)));
        out.push(("return_5", pct_change(&close, 5)));
        out.push(("return_20", pct_change(&close, 20)));

        let mut long_sma = Sma::new(self.config.long_window.max(1));
        let dist_sma: Vec<f64> = close
            .iter()
            .map(|c| match long_sma.push(*c) {
                Some(avg) => safe_div(*c, avg) - 1.0,
                None => f64::NAN,
            })
            .collect();
        out.push(("Dist_SMA200", dist_sma));
        out.push(("Momentum_5", diff(&close, 5)));
        out.push(("Momentum_10", diff(&close, 10)));
        out.push(("Momentum_20", diff(&close, 20)));

        let mut rsi = Rsi::new(RSI_PERIOD);
        out.push((
            "RSI_21",
            close.iter().map(|c| rsi.push(*c).unwrap_or(f64::NAN)).collect(),
        ));

        let (macd, macd_signal) = macd_lines(&close);
        out.push(("MACD", macd));
        out.push(("MACD_Signal", macd_signal));

        let mut atr = Atr::new(ATR_PERIOD);
        out.push((
            "ATR_14",
            raw.bars
                .iter()
                .map(|b| atr.push(b).unwrap_or(f64::NAN))
                .collect(),
        ));

        let bands = bollinger(&close);
        out.push(("BB_Middle", bands.middle.clone()));
        out.push(("BB_Std", bands.std.clone()));
        out.push(("BB_Upper", bands.upper.clone()));
        out.push(("BB_Lower", bands.lower.clone()));
        let width = (0..n)
            .map(|i| safe_div(bands.upper[i] - bands.lower[i], bands.middle[i]))
            .collect();
        out.push(("BB_Width", width));
        let position = (0..n)
            .map(|i| safe_div(close[i] - bands.lower[i], bands.upper[i] - bands.lower[i]))
            .collect();
        out.push(("BB_Position", position));
        out.push(("STD_20", bands.std));

        let parkinson_k = 1.0 / (4.0 * std::f64::consts::LN_2);
        let parkinson = (0..n)
            .map(|i| {
                let ln_hl = safe_div(high[i], low[i]).ln();
                (parkinson_k * ln_hl * ln_hl).sqrt()
            })
            .collect();
        out.push(("Parkinson_Vol", parkinson));
        out.push((
            "Range_High_Low",
            (0..n).map(|i| safe_div(high[i] - low[i], close[i])).collect(),
        ));

        let close_delta = diff(&close, 1);
        let signed_volume: Vec<f64> = (0..n)
            .map(|i| {
                let s = sign(close_delta[i]);
                if s.is_nan() {
                    0.0
                } else {
                    s * volume[i]
                }
            })
            .collect();
        out.push(("OBV", cumsum(&signed_volume)));
        let mut vol_sma = Sma::new(VOLUME_PERIOD);
        out.push((
            "Volume_Ratio",
            volume
                .iter()
                .map(|v| match vol_sma.push(*v) {
                    Some(avg) => safe_div(*v, avg),
                    None => f64::NAN,
                })
                .collect(),
        ));
        // cumulative from series start, not rolling
        let cum_vol = cumsum(&volume);
        let weighted: Vec<f64> = raw
            .bars
            .iter()
            .map(|b| b.volume * b.typical_price())
            .collect();
        let cum_weighted = cumsum(&weighted);
        out.push((
            "VWAP",
            (0..n).map(|i| safe_div(cum_weighted[i], cum_vol[i])).collect(),
        ));

        let tau = std::f64::consts::TAU;
        let dow: Vec<f64> = raw
            .bars
            .iter()
            .map(|b| b.date.weekday().num_days_from_monday() as f64)
            .collect();
        let month: Vec<f64> = raw.bars.iter().map(|b| b.date.month() as f64).collect();
        out.push(("DoW_sin", dow.iter().map(|d| (tau * d / TRADING_WEEK).sin()).collect()));
        out.push(("DoW_cos", dow.iter().map(|d| (tau * d / TRADING_WEEK).cos()).collect()));
        out.push(("Month_sin", month.iter().map(|m| (tau * m / MONTHS).sin()).collect()));
        out.push(("Month_cos", month.iter().map(|m| (tau * m / MONTHS).cos()).collect()));

        debug_assert!(out.iter().map(|(name, _)| *name).eq(FEATURE_COLUMNS.iter().copied()));
        out
    }
}

fn macd_lines(close: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut fast = Ema::new(MACD_FAST);
    let mut slow = Ema::new(MACD_SLOW);
    let mut signal = Ema::new(MACD_SIGNAL);
    let mut macd = Vec::with_capacity(close.len());
    let mut sig = Vec::with_capacity(close.len());
    for c in close {
        let line = match (fast.push(*c), slow.push(*c)) {
            (Some(f), Some(s)) => f - s,
            _ => f64::NAN,
        };
        macd.push(line);
        sig.push(signal.push(line).unwrap_or(f64::NAN));
    }
    (macd, sig)
}

struct Bands {
    middle: Vec<f64>,
    std: Vec<f64>,
    upper: Vec<f64>,
    lower: Vec<f64>,
}

fn bollinger(close: &[f64]) -> Bands {
    let mut sma = Sma::new(BB_PERIOD);
    let mut sd = RollingStd::new(BB_PERIOD);
    let mut bands = Bands {
        middle: Vec::with_capacity(close.len()),
        std: Vec::with_capacity(close.len()),
        upper: Vec::with_capacity(close.len()),
        lower: Vec::with_capacity(close.len()),
    };
    for c in close {
        let m = sma.push(*c).unwrap_or(f64::NAN);
        let s = sd.push(*c).unwrap_or(f64::NAN);
        bands.middle.push(m);
        bands.std.push(s);
        bands.upper.push(m + BB_MULT * s);
        bands.lower.push(m - BB_MULT * s);
    }
    bands
}
