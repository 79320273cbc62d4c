use chrono::{DateTime, NaiveDate, NaiveTime};
use url::Url;

use crate::error::{ForecastError, ForecastResult};
use crate::model::bar::DailyBar;
use crate::model::series::CloseSeries;

use super::types::{ChartResponse, ChartResult};

/// Daily OHLCV client for a chart-style quote API.
pub struct ChartClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ChartClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> ForecastResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ForecastError::Config(format!("invalid chart_base_url: {}", e)))?;
        Ok(Self { http, base_url })
    }

    fn chart_url(&self, symbol: &str, from: NaiveDate, to: NaiveDate) -> ForecastResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ForecastError::Config("chart_base_url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        let period1 = from.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = to.and_time(NaiveTime::MIN).and_utc().timestamp() + 86_400;
        url.query_pairs_mut()
            .append_pair("period1", &period1.to_string())
            .append_pair("period2", &period2.to_string())
            .append_pair("interval", "1d");
        Ok(url)
    }

    pub async fn get_daily_bars(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ForecastResult<Vec<DailyBar>> {
        let url = self.chart_url(symbol, from, to)?;
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(ForecastError::DataUnavailable(format!(
                "chart request for {} returned {}",
                symbol, status
            )));
        }
        let body: ChartResponse = response.json().await?;
        if let Some(err) = body.chart.error {
            return Err(ForecastError::DataUnavailable(format!(
                "chart error for {}: {} ({})",
                symbol, err.description, err.code
            )));
        }
        let result = body
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| {
                ForecastError::DataUnavailable(format!("chart for {} has no result", symbol))
            })?;
        let bars = bars_from_chart(&result);
        tracing::debug!(symbol, count = bars.len(), "fetched daily bars");
        Ok(bars)
    }

    pub async fn get_daily_closes(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ForecastResult<CloseSeries> {
        let bars = self.get_daily_bars(symbol, from, to).await?;
        Ok(bars.into_iter().map(|b| (b.date, b.close)).collect())
    }
}

/// Convert parallel chart arrays into bars, skipping days without a close.
/// Missing open/high/low fall back to the close; missing volume to 0.
pub fn bars_from_chart(result: &ChartResult) -> Vec<DailyBar> {
    let offset = result.meta.as_ref().map_or(0, |m| m.gmtoffset);
    let Some(quote) = result.indicators.quote.first() else {
        return Vec::new();
    };
    let at = |v: &[Option<f64>], i: usize| v.get(i).copied().flatten();

    let mut bars: Vec<DailyBar> = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let Some(close) = at(&quote.close, i) else {
            continue;
        };
        let Some(local) = DateTime::from_timestamp(ts + offset, 0) else {
            continue;
        };
        let date = local.date_naive();
        // the API can repeat the current session as a live row
        if bars.last().map_or(false, |b| b.date == date) {
            bars.pop();
        }
        bars.push(DailyBar {
            date,
            open: at(&quote.open, i).unwrap_or(close),
            high: at(&quote.high, i).unwrap_or(close),
            low: at(&quote.low, i).unwrap_or(close),
            close,
            volume: at(&quote.volume, i).unwrap_or(0.0),
        });
    }
    bars.sort_by_key(|b| b.date);
    bars
}
