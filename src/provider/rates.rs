use chrono::NaiveDate;
use url::Url;

use crate::error::{ForecastError, ForecastResult};
use crate::model::series::CloseSeries;

use super::types::RateObservation;

const DATE_FORMAT: &str = "%d/%m/%Y";

/// Client for the central bank's time-series (SGS) API.
pub struct RateSeriesClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RateSeriesClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> ForecastResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ForecastError::Config(format!("invalid rate_base_url: {}", e)))?;
        Ok(Self { http, base_url })
    }

    fn series_url(&self, series: u32, from: NaiveDate, to: NaiveDate) -> ForecastResult<Url> {
        let series_segment = format!("bcdata.sgs.{}", series);
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ForecastError::Config("rate_base_url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["dados", "serie", series_segment.as_str(), "dados"]);
        url.query_pairs_mut()
            .append_pair("formato", "json")
            .append_pair("dataInicial", &from.format(DATE_FORMAT).to_string())
            .append_pair("dataFinal", &to.format(DATE_FORMAT).to_string());
        Ok(url)
    }

    pub async fn get_series(
        &self,
        series: u32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ForecastResult<CloseSeries> {
        let url = self.series_url(series, from, to)?;
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ForecastError::DataUnavailable(format!(
                "rate series {} returned {}",
                series,
                response.status()
            )));
        }
        let observations: Vec<RateObservation> = response.json().await?;
        let parsed = parse_observations(&observations);
        if parsed.is_empty() {
            return Err(ForecastError::DataUnavailable(format!(
                "rate series {} is empty",
                series
            )));
        }
        Ok(parsed)
    }
}

pub fn parse_observations(observations: &[RateObservation]) -> CloseSeries {
    observations
        .iter()
        .filter_map(|o| {
            NaiveDate::parse_from_str(o.data.trim(), DATE_FORMAT)
                .ok()
                .map(|d| (d, o.valor))
        })
        .collect()
}
