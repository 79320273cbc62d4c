use super::sma::Sma;
use crate::model::bar::DailyBar;

/// Average true range as a simple rolling mean of true range.
#[derive(Debug, Clone)]
pub struct Atr {
    prev_close: Option<f64>,
    tr: Sma,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        Self {
            prev_close: None,
            tr: Sma::new(period.max(1)),
        }
    }

    pub fn push(&mut self, bar: &DailyBar) -> Option<f64> {
        let tr = bar.true_range(self.prev_close);
        self.prev_close = Some(bar.close);
        self.tr.push(tr)
    }
}
