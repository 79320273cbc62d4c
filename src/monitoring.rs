use std::collections::VecDeque;
use std::sync::Mutex;

use serde::Deserialize;

use crate::model::forecast::Direction;

pub const SHADOW_ERROR_WINDOW: usize = 250;

/// Fire-and-forget telemetry produced by the core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MonitoringSample {
    PredictedPrice { day: u32, price: f64 },
    LastConfidence(f64),
    Direction(Direction),
    InputPrice(f64),
    ShadowError { absolute: f64, relative: f64 },
}

pub trait MonitoringSink: Send + Sync {
    fn emit(&self, sample: MonitoringSample);
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// Run back-shifted shadow validation on each prediction.
    pub shadow_enabled: bool,
    pub shadow_error_window: usize,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            shadow_enabled: true,
            shadow_error_window: SHADOW_ERROR_WINDOW,
        }
    }
}

/// Rolling window of shadow errors for drift summaries.
#[derive(Debug, Clone)]
pub struct ShadowErrorWindow {
    window: usize,
    errors: VecDeque<(f64, f64)>,
}

impl Default for ShadowErrorWindow {
    fn default() -> Self {
        Self::with_window(SHADOW_ERROR_WINDOW)
    }
}

impl ShadowErrorWindow {
    pub fn with_window(window: usize) -> Self {
        Self {
            window: window.max(1),
            errors: VecDeque::with_capacity(window.max(1)),
        }
    }

    pub fn observe(&mut self, absolute: f64, relative: f64) {
        if !absolute.is_finite() || !relative.is_finite() {
            return;
        }
        self.errors.push_back((absolute, relative));
        if self.errors.len() > self.window {
            let _ = self.errors.pop_front();
        }
    }

    pub fn sample_count(&self) -> usize {
        self.errors.len()
    }

    pub fn mae(&self) -> Option<f64> {
        let n = self.errors.len();
        if n == 0 {
            return None;
        }
        Some(self.errors.iter().map(|(a, _)| a).sum::<f64>() / n as f64)
    }

    pub fn mean_relative_error(&self) -> Option<f64> {
        let n = self.errors.len();
        if n == 0 {
            return None;
        }
        Some(self.errors.iter().map(|(_, r)| r).sum::<f64>() / n as f64)
    }
}

/// Emits every sample as a structured `tracing` event and keeps a rolling
/// shadow-error summary.
#[derive(Debug, Default)]
pub struct TracingSink {
    shadow: Mutex<ShadowErrorWindow>,
}

impl TracingSink {
    pub fn new(shadow_window: usize) -> Self {
        Self {
            shadow: Mutex::new(ShadowErrorWindow::with_window(shadow_window)),
        }
    }

    pub fn shadow_summary(&self) -> Option<(usize, f64, f64)> {
        let w = self.shadow.lock().ok()?;
        Some((w.sample_count(), w.mae()?, w.mean_relative_error()?))
    }
}

impl MonitoringSink for TracingSink {
    fn emit(&self, sample: MonitoringSample) {
        match sample {
            MonitoringSample::PredictedPrice { day, price } => {
                tracing::info!(metric = "predicted_price", day, price, "monitoring sample");
            }
            MonitoringSample::LastConfidence(confidence) => {
                tracing::info!(metric = "last_confidence", confidence, "monitoring sample");
            }
            MonitoringSample::Direction(direction) => {
                tracing::info!(
                    metric = "direction_total",
                    direction = direction.as_str(),
                    "monitoring sample"
                );
            }
            MonitoringSample::InputPrice(price) => {
                tracing::info!(metric = "input_price", price, "monitoring sample");
            }
            MonitoringSample::ShadowError { absolute, relative } => {
                let Ok(mut window) = self.shadow.lock() else {
                    return;
                };
                window.observe(absolute, relative);
                tracing::info!(
                    metric = "shadow_error",
                    absolute,
                    relative,
                    rolling_mae = window.mae().unwrap_or(f64::NAN),
                    rolling_samples = window.sample_count(),
                    "monitoring sample"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_evicts_oldest() {
        let mut w = ShadowErrorWindow::with_window(2);
        w.observe(1.0, 0.01);
        w.observe(2.0, 0.02);
        w.observe(4.0, 0.04);
        assert_eq!(w.sample_count(), 2);
        assert!((w.mae().unwrap() - 3.0).abs() < 1e-12);
        assert!((w.mean_relative_error().unwrap() - 0.03).abs() < 1e-12);
    }

    #[test]
    fn non_finite_errors_ignored() {
        let mut w = ShadowErrorWindow::default();
        w.observe(f64::NAN, 0.1);
        assert_eq!(w.sample_count(), 0);
        assert_eq!(w.mae(), None);
    }

    #[test]
    fn tracing_sink_tracks_shadow_errors() {
        let sink = TracingSink::new(10);
        sink.emit(MonitoringSample::ShadowError {
            absolute: 0.5,
            relative: 0.01,
        });
        sink.emit(MonitoringSample::InputPrice(34.5));
        let (n, mae, rel) = sink.shadow_summary().unwrap();
        assert_eq!(n, 1);
        assert!((mae - 0.5).abs() < 1e-12);
        assert!((rel - 0.01).abs() < 1e-12);
    }
}
