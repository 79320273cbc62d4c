pub mod bar;
pub mod forecast;
pub mod series;

pub use bar::DailyBar;
pub use forecast::{
    Direction, ForecastItem, MacroFigures, MarketContext, PredictionMode, PredictionRequest,
    PredictionResponse, ShadowResult, TechnicalFigures, Trend,
};
pub use series::{CloseSeries, MacroInstrument, RawSeries, ReferenceRate};
