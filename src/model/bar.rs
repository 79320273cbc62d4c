use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day of the target instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl DailyBar {
    /// Zero-valued bar used by fallback datasets; close 0 marks a non-trading price.
    pub fn sentinel(date: NaiveDate) -> Self {
        Self {
            date,
            open: 0.0,
            high: 0.0,
            low: 0.0,
            close: 0.0,
            volume: 0.0,
        }
    }

    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// True range against the previous close. Without a previous close this is high-low.
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        let hl = self.high - self.low;
        match prev_close {
            Some(prev) => hl
                .max((self.high - prev).abs())
                .max((self.low - prev).abs()),
            None => hl,
        }
    }
}
