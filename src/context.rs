//! Display figures describing the market at the reference date.

use crate::features::FeatureMatrix;
use crate::model::forecast::{round2, MacroFigures, MarketContext, TechnicalFigures, Trend};
use crate::model::series::{MacroInstrument, RawSeries};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const NEUTRAL_RSI: f64 = 50.0;

/// Compound a daily percentage rate to an annual percentage.
pub fn annualize_daily_rate(daily_pct: f64) -> f64 {
    ((1.0 + daily_pct / 100.0).powf(TRADING_DAYS_PER_YEAR) - 1.0) * 100.0
}

fn finite_or(v: Option<f64>, default: f64) -> f64 {
    match v {
        Some(x) if x.is_finite() => x,
        _ => default,
    }
}

/// Trend of the last close against its long moving average, clipped to the
/// available history.
pub fn long_trend(closes: &[f64], long_window: usize) -> Trend {
    let real: Vec<f64> = closes.iter().copied().filter(|c| *c > 0.0).collect();
    let Some(last) = real.last().copied() else {
        return Trend::Undefined;
    };
    let window = long_window.min(real.len()).max(1);
    let sma = real[real.len() - window..].iter().sum::<f64>() / window as f64;
    if last > sma {
        Trend::Up
    } else {
        Trend::Down
    }
}

/// Build the snapshot from the raw series and the resolved, unscaled matrix.
pub fn market_context(
    raw: &RawSeries,
    features: &FeatureMatrix,
    long_window: usize,
    rate_is_daily: bool,
) -> MarketContext {
    let last_macro = |m: MacroInstrument| {
        finite_or(
            raw.macro_closes(m)
                .and_then(|s| s.values().next_back().copied()),
            0.0,
        )
    };
    let rate = finite_or(raw.rate.latest(), 0.0);
    let rate = if rate_is_daily {
        annualize_daily_rate(rate)
    } else {
        rate
    };

    let last_row = features.n_rows().checked_sub(1);
    let tech = |name: &str, default: f64| {
        finite_or(last_row.and_then(|r| features.value(r, name)), default)
    };

    MarketContext {
        current_price: round2(finite_or(features.closes().last().copied(), 0.0)),
        reference_date: features.last_date(),
        macro_figures: MacroFigures {
            usd_fx: round2(last_macro(MacroInstrument::UsdFx)),
            brent: round2(last_macro(MacroInstrument::Brent)),
            equity_index: round2(last_macro(MacroInstrument::EquityIndex)),
            reference_rate: round2(rate),
        },
        technicals: TechnicalFigures {
            rsi: round2(tech("RSI_21", NEUTRAL_RSI)),
            macd: round2(tech("MACD", 0.0)),
            atr: round2(tech("ATR_14", 0.0)),
            vwap: round2(tech("VWAP", 0.0)),
            sma200_trend: long_trend(features.closes(), long_window),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annualizes_daily_rate_over_trading_year() {
        let annual = annualize_daily_rate(0.043739);
        assert!((annual - 11.65).abs() < 0.01, "annual = {}", annual);
    }

    #[test]
    fn trend_ignores_sentinel_closes() {
        assert_eq!(long_trend(&[0.0, 0.0], 200), Trend::Undefined);
        assert_eq!(long_trend(&[0.0, 10.0, 11.0, 12.0], 200), Trend::Up);
        assert_eq!(long_trend(&[12.0, 11.0, 10.0], 2), Trend::Down);
    }
}
