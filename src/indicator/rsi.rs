use super::sma::Sma;

/// Relative strength index from simple rolling means of gains and losses.
///
/// Undefined (`None`) during warm-up and whenever the average loss is zero.
#[derive(Debug, Clone)]
pub struct Rsi {
    prev_price: Option<f64>,
    avg_gain: Sma,
    avg_loss: Sma,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "RSI period must be > 0");
        Self {
            prev_price: None,
            avg_gain: Sma::new(period),
            avg_loss: Sma::new(period),
        }
    }

    pub fn push(&mut self, price: f64) -> Option<f64> {
        let Some(prev) = self.prev_price.replace(price) else {
            // first delta counts as neither gain nor loss but fills a slot
            self.avg_gain.push(0.0);
            self.avg_loss.push(0.0);
            return None;
        };
        let delta = price - prev;
        let gain = self.avg_gain.push(delta.max(0.0));
        let loss = self.avg_loss.push((-delta).max(0.0));
        rsi_from_averages(gain?, loss?)
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        return None;
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}
