/// Simple Moving Average using a ring buffer for O(1) push.
///
/// A non-finite input poisons the average until it leaves the window, so a
/// gap in the source series shows up as `None` for exactly `period` pushes.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    buffer: Vec<f64>,
    head: usize,
    count: usize,
    sum: f64,
    non_finite: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "SMA period must be > 0");
        Self {
            period,
            buffer: vec![0.0; period],
            head: 0,
            count: 0,
            sum: 0.0,
            non_finite: 0,
        }
    }

    /// Push a new value, return the current SMA if the window is full and finite.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        if self.count >= self.period {
            let evicted = self.buffer[self.head];
            if evicted.is_finite() {
                self.sum -= evicted;
            } else {
                self.non_finite -= 1;
            }
        }
        self.buffer[self.head] = value;
        if value.is_finite() {
            self.sum += value;
        } else {
            self.non_finite += 1;
        }
        self.head = (self.head + 1) % self.period;
        if self.count < self.period {
            self.count += 1;
        }
        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        if self.is_ready() {
            Some(self.sum / self.period as f64)
        } else {
            None
        }
    }

    pub fn is_ready(&self) -> bool {
        self.count >= self.period && self.non_finite == 0
    }

    pub fn period(&self) -> usize {
        self.period
    }
}
