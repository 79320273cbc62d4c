pub mod atr;
pub mod ema;
pub mod rolling_std;
pub mod rsi;
pub mod sma;

pub use atr::Atr;
pub use ema::Ema;
pub use rolling_std::RollingStd;
pub use rsi::Rsi;
pub use sma::Sma;
