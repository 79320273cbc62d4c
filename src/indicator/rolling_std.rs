use std::collections::VecDeque;

/// Rolling sample standard deviation (n - 1 denominator).
#[derive(Debug, Clone)]
pub struct RollingStd {
    period: usize,
    values: VecDeque<f64>,
}

impl RollingStd {
    pub fn new(period: usize) -> Self {
        assert!(period > 1, "RollingStd period must be > 1");
        Self {
            period,
            values: VecDeque::with_capacity(period),
        }
    }

    pub fn push(&mut self, value: f64) -> Option<f64> {
        self.values.push_back(value);
        while self.values.len() > self.period {
            let _ = self.values.pop_front();
        }
        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        if self.values.len() < self.period || self.values.iter().any(|v| !v.is_finite()) {
            return None;
        }
        let n = self.values.len() as f64;
        let mean = self.values.iter().sum::<f64>() / n;
        let variance = self
            .values
            .iter()
            .map(|v| {
                let d = *v - mean;
                d * d
            })
            .sum::<f64>()
            / (n - 1.0);
        Some(variance.sqrt())
    }
}
