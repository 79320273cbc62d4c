//! Market-data retrieval seam. Retries belong to implementations; callers
//! only bound the wait.

pub mod chart;
pub mod rates;
pub mod types;

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use chrono::{Days, NaiveDate, Utc};
use futures_util::future::try_join4;
use serde::Deserialize;

use crate::error::{ForecastError, ForecastResult};
use crate::model::series::{MacroInstrument, RawSeries, ReferenceRate};

pub use chart::ChartClient;
pub use rates::RateSeriesClient;

/// Supplies daily series covering at least `trading_days` sessions, or an
/// explicit `DataUnavailable`. Never returns a partially-populated series.
pub trait MarketSeriesProvider: Send + Sync {
    fn fetch(&self, trading_days: usize) -> impl Future<Output = ForecastResult<RawSeries>> + Send;
}

/// Run `provider.fetch` bounded by `timeout`.
pub async fn fetch_with_timeout<P: MarketSeriesProvider>(
    provider: &P,
    trading_days: usize,
    timeout: Duration,
) -> ForecastResult<RawSeries> {
    match tokio::time::timeout(timeout, provider.fetch(trading_days)).await {
        Ok(result) => result,
        Err(_) => Err(ForecastError::DataUnavailable(format!(
            "market data fetch timed out after {} ms",
            timeout.as_millis()
        ))),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MacroSymbols {
    pub usd_fx: String,
    pub brent: String,
    pub equity_index: String,
}

impl MacroSymbols {
    pub fn symbol(&self, instrument: MacroInstrument) -> &str {
        match instrument {
            MacroInstrument::UsdFx => &self.usd_fx,
            MacroInstrument::Brent => &self.brent,
            MacroInstrument::EquityIndex => &self.equity_index,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub target_symbol: String,
    pub macro_symbols: MacroSymbols,
    pub chart_base_url: String,
    pub rate_base_url: String,
    pub rate_series: u32,
    /// The rate series is quoted per day rather than per year.
    #[serde(default)]
    pub rate_is_daily: bool,
    /// Used when the rate series cannot be fetched.
    pub fallback_rate: f64,
    pub timeout_ms: u64,
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }
}

/// Calendar days to request so roughly `trading_days` sessions come back.
pub fn calendar_span(trading_days: usize) -> u64 {
    // 5 sessions per 7 days, plus slack for holidays
    (trading_days as u64 * 7).div_ceil(5) + 15
}

/// HTTP-backed provider: chart API for the target and macro instruments,
/// central-bank series for the reference rate.
pub struct HttpMarketProvider {
    config: ProviderConfig,
    chart: ChartClient,
    rates: RateSeriesClient,
}

impl HttpMarketProvider {
    pub fn new(config: ProviderConfig) -> ForecastResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent("Mozilla/5.0")
            .timeout(config.timeout())
            .build()?;
        let chart = ChartClient::new(http.clone(), &config.chart_base_url)?;
        let rates = RateSeriesClient::new(http, &config.rate_base_url)?;
        Ok(Self {
            config,
            chart,
            rates,
        })
    }

    async fn fetch_rate(&self, from: NaiveDate, to: NaiveDate) -> ReferenceRate {
        match self.rates.get_series(self.config.rate_series, from, to).await {
            Ok(series) => ReferenceRate::Series(series),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    fallback = self.config.fallback_rate,
                    "reference rate unavailable, using configured constant"
                );
                ReferenceRate::Scalar(self.config.fallback_rate)
            }
        }
    }
}

impl MarketSeriesProvider for HttpMarketProvider {
    async fn fetch(&self, trading_days: usize) -> ForecastResult<RawSeries> {
        let to = Utc::now().date_naive();
        let from = to
            .checked_sub_days(Days::new(calendar_span(trading_days)))
            .unwrap_or(NaiveDate::MIN);
        let symbols = &self.config.macro_symbols;

        // the rate has its own fallback, so it must not extend the chart calls' wait
        let (charts, rate) = tokio::join!(
            try_join4(
                self.chart
                    .get_daily_bars(&self.config.target_symbol, from, to),
                self.chart
                    .get_daily_closes(symbols.symbol(MacroInstrument::UsdFx), from, to),
                self.chart
                    .get_daily_closes(symbols.symbol(MacroInstrument::Brent), from, to),
                self.chart
                    .get_daily_closes(symbols.symbol(MacroInstrument::EquityIndex), from, to),
            ),
            self.fetch_rate(from, to),
        );
        let (bars, usd, brent, index) = charts?;

        let mut macros = BTreeMap::new();
        macros.insert(MacroInstrument::UsdFx, usd);
        macros.insert(MacroInstrument::Brent, brent);
        macros.insert(MacroInstrument::EquityIndex, index);

        if bars.len() < trading_days {
            tracing::warn!(
                symbol = %self.config.target_symbol,
                requested = trading_days,
                received = bars.len(),
                "provider returned less history than requested"
            );
        }
        tracing::info!(
            symbol = %self.config.target_symbol,
            bars = bars.len(),
            from = %from,
            to = %to,
            "fetched market series"
        );
        RawSeries::new(bars, macros, rate)
    }
}
