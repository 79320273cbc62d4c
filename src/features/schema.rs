use chrono::NaiveDate;
use ndarray::{s, Array2, ArrayView2};

use crate::error::{ForecastError, ForecastResult};

pub const SCHEMA_VERSION: &str = "v1";

/// Ordered model input columns. The input normalization must have been fitted
/// on this order (or on a subset of these names).
pub const FEATURE_COLUMNS: [&str; 34] = [
    // lagged macro
    "USDBRL_t-1",
    "Brent_t-1",
    "Ibovespa_t-1",
    "Selic_t-1",
    "Ibov_Return_t-1",
    "Brent_Return_t-1",
    "USD_Return_t-1",
    // own returns
    "return_1",
    "return_5",
    "return_20",
    // momentum and oscillators
    "Dist_SMA200",
    "Momentum_5",
    "Momentum_10",
    "Momentum_20",
    "RSI_21",
    "MACD",
    "MACD_Signal",
    // volatility
    "ATR_14",
    "BB_Middle",
    "BB_Std",
    "BB_Upper",
    "BB_Lower",
    "BB_Width",
    "BB_Position",
    "STD_20",
    "Parkinson_Vol",
    "Range_High_Low",
    // volume
    "OBV",
    "Volume_Ratio",
    "VWAP",
    // calendar
    "DoW_sin",
    "DoW_cos",
    "Month_sin",
    "Month_cos",
];

/// Row-per-date numeric matrix with a parallel close-price series.
///
/// Rows whose date is `None` are left padding; their close is 0.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    values: Array2<f64>,
    dates: Vec<Option<NaiveDate>>,
    closes: Vec<f64>,
}

impl FeatureMatrix {
    pub fn new(
        columns: Vec<String>,
        values: Array2<f64>,
        dates: Vec<Option<NaiveDate>>,
        closes: Vec<f64>,
    ) -> ForecastResult<Self> {
        let (rows, cols) = values.dim();
        if cols != columns.len() || rows != dates.len() || rows != closes.len() {
            return Err(ForecastError::Alignment(format!(
                "matrix shape {}x{} does not match {} columns / {} dates / {} closes",
                rows,
                cols,
                columns.len(),
                dates.len(),
                closes.len()
            )));
        }
        Ok(Self {
            columns,
            values,
            dates,
            closes,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn dates(&self) -> &[Option<NaiveDate>] {
        &self.dates
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_position(name)?;
        Some(self.values.column(idx).to_vec())
    }

    pub fn value(&self, row: usize, name: &str) -> Option<f64> {
        let idx = self.column_position(name)?;
        self.values.get((row, idx)).copied()
    }

    pub fn is_padded(&self, row: usize) -> bool {
        self.dates.get(row).map_or(false, |d| d.is_none())
    }

    pub fn padded_rows(&self) -> usize {
        self.dates.iter().take_while(|d| d.is_none()).count()
    }

    pub fn has_undefined(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.iter().rev().find_map(|d| *d)
    }

    /// Replace the numeric block, keeping columns, dates and closes.
    pub fn with_values(&self, values: Array2<f64>) -> ForecastResult<Self> {
        Self::new(
            self.columns.clone(),
            values,
            self.dates.clone(),
            self.closes.clone(),
        )
    }

    /// `len` rows ending `offset_from_end` rows before the last row.
    pub fn window(&self, len: usize, offset_from_end: usize) -> ForecastResult<MatrixWindow<'_>> {
        let available = self.n_rows().saturating_sub(offset_from_end);
        if len == 0 || available < len {
            return Err(ForecastError::InsufficientHistory {
                required: len + offset_from_end,
                available: self.n_rows(),
            });
        }
        let end = available;
        let start = end - len;
        Ok(MatrixWindow {
            values: self.values.slice(s![start..end, ..]),
            base_close: self.closes[end - 1],
            end_date: self.dates[end - 1],
        })
    }
}

/// Borrowed contiguous slice of an aligned matrix fed to the model as one sequence.
#[derive(Debug, Clone)]
pub struct MatrixWindow<'a> {
    pub values: ArrayView2<'a, f64>,
    /// Last real close at the window's final row.
    pub base_close: f64,
    pub end_date: Option<NaiveDate>,
}

impl MatrixWindow<'_> {
    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.values.nrows() == 0
    }
}
