use thiserror::Error;

/// Coarse outcome class the serving layer maps to a user-visible status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    /// Artifacts are missing; the service is up but cannot run the model.
    Degraded,
    /// The request cannot be served with the data at hand.
    BadInput,
    Internal,
}

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("market data unavailable: {0}")]
    DataUnavailable(String),

    #[error("insufficient history: need {required} rows, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("horizon of {requested} days is outside 1..={max}")]
    InvalidHorizon { requested: u32, max: u32 },

    #[error("normalization alignment error: {0}")]
    Alignment(String),

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("inference error: {0}")]
    Inference(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ForecastError {
    pub fn status(&self) -> ServiceStatus {
        match self {
            ForecastError::ModelUnavailable(_) => ServiceStatus::Degraded,
            ForecastError::InsufficientHistory { .. } | ForecastError::InvalidHorizon { .. } => {
                ServiceStatus::BadInput
            }
            _ => ServiceStatus::Internal,
        }
    }
}

pub type ForecastResult<T> = Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_unavailable_is_distinct_from_internal_failure() {
        let degraded = ForecastError::ModelUnavailable("missing model".to_string());
        let failed = ForecastError::Inference("bad shape".to_string());
        assert_eq!(degraded.status(), ServiceStatus::Degraded);
        assert_eq!(failed.status(), ServiceStatus::Internal);
    }

    #[test]
    fn insufficient_history_message_names_both_counts() {
        let err = ForecastError::InsufficientHistory {
            required: 20,
            available: 10,
        };
        assert_eq!(err.status(), ServiceStatus::BadInput);
        assert_eq!(err.to_string(), "insufficient history: need 20 rows, have 10");
    }
}
