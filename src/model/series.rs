use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, ForecastResult};
use crate::model::bar::DailyBar;

/// Close-only series keyed by trading date.
pub type CloseSeries = BTreeMap<NaiveDate, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MacroInstrument {
    UsdFx,
    Brent,
    EquityIndex,
}

impl MacroInstrument {
    pub fn all() -> [MacroInstrument; 3] {
        [
            MacroInstrument::UsdFx,
            MacroInstrument::Brent,
            MacroInstrument::EquityIndex,
        ]
    }
}

/// Short-term reference interest rate, either a constant or a dated series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReferenceRate {
    Scalar(f64),
    Series(CloseSeries),
}

impl ReferenceRate {
    /// Rate in force on `date`: the latest observation at or before it.
    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        match self {
            ReferenceRate::Scalar(v) => Some(*v),
            ReferenceRate::Series(s) => s.range(..=date).next_back().map(|(_, v)| *v),
        }
    }

    pub fn latest(&self) -> Option<f64> {
        match self {
            ReferenceRate::Scalar(v) => Some(*v),
            ReferenceRate::Series(s) => s.values().next_back().copied(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    /// Target instrument bars, chronological, trading days only.
    pub bars: Vec<DailyBar>,
    pub macros: BTreeMap<MacroInstrument, CloseSeries>,
    pub rate: ReferenceRate,
}

impl RawSeries {
    /// Build a series, sorting bars and rejecting empty or duplicated dates.
    pub fn new(
        mut bars: Vec<DailyBar>,
        macros: BTreeMap<MacroInstrument, CloseSeries>,
        rate: ReferenceRate,
    ) -> ForecastResult<Self> {
        if bars.is_empty() {
            return Err(ForecastError::DataUnavailable(
                "target series is empty".to_string(),
            ));
        }
        bars.sort_by_key(|b| b.date);
        if bars.windows(2).any(|w| w[0].date == w[1].date) {
            return Err(ForecastError::DataUnavailable(
                "target series has duplicated dates".to_string(),
            ));
        }
        for instrument in MacroInstrument::all() {
            if macros.get(&instrument).map_or(true, |s| s.is_empty()) {
                return Err(ForecastError::DataUnavailable(format!(
                    "macro series {:?} is missing",
                    instrument
                )));
            }
        }
        Ok(Self { bars, macros, rate })
    }

    /// Zero/sentinel dataset covering the `rows` weekdays ending at `end`.
    pub fn fallback(end: NaiveDate, rows: usize, rate: f64) -> Self {
        let mut dates = Vec::with_capacity(rows);
        let mut d = end;
        while dates.len() < rows {
            if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
                dates.push(d);
            }
            d = match d.checked_sub_days(Days::new(1)) {
                Some(prev) => prev,
                None => break,
            };
        }
        dates.reverse();
        let bars = dates.iter().map(|d| DailyBar::sentinel(*d)).collect();
        let macros = MacroInstrument::all()
            .into_iter()
            .map(|m| (m, dates.iter().map(|d| (*d, 0.0)).collect()))
            .collect();
        Self {
            bars,
            macros,
            rate: ReferenceRate::Scalar(rate),
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last_bar(&self) -> Option<&DailyBar> {
        self.bars.last()
    }

    pub fn macro_closes(&self, instrument: MacroInstrument) -> Option<&CloseSeries> {
        self.macros.get(&instrument)
    }

    /// Macro closes re-indexed onto the target dates with forward fill.
    /// Dates before the first macro observation stay NaN.
    pub fn macro_aligned(&self, instrument: MacroInstrument) -> Vec<f64> {
        let Some(series) = self.macros.get(&instrument) else {
            return vec![f64::NAN; self.bars.len()];
        };
        self.bars
            .iter()
            .map(|b| {
                series
                    .range(..=b.date)
                    .next_back()
                    .map(|(_, v)| *v)
                    .unwrap_or(f64::NAN)
            })
            .collect()
    }

    pub fn rate_aligned(&self) -> Vec<f64> {
        self.bars
            .iter()
            .map(|b| self.rate.value_on(b.date).unwrap_or(f64::NAN))
            .collect()
    }
}
