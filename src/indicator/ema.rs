/// Recursive exponential moving average, `alpha = 2 / (span + 1)`.
///
/// Seeded with the first finite observation, so a value is available from the
/// very first push. Non-finite inputs are skipped and leave the state untouched.
#[derive(Debug, Clone)]
pub struct Ema {
    alpha: f64,
    ema: Option<f64>,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span > 0, "EMA span must be > 0");
        Self {
            alpha: 2.0 / (span as f64 + 1.0),
            ema: None,
        }
    }

    /// Push a new value, return the current EMA.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return self.ema;
        }
        self.ema = Some(match self.ema {
            Some(prev) => (value - prev) * self.alpha + prev,
            None => value,
        });
        self.ema
    }

    pub fn value(&self) -> Option<f64> {
        self.ema
    }

    pub fn is_ready(&self) -> bool {
        self.ema.is_some()
    }
}
