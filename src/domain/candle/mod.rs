//! Candle domain: canonical OHLCV bars and the per-source normalizers.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod upload;
pub mod wire;

use serde::{Deserialize, Serialize};

use crate::shared::INVALID_TIME;

pub use convert::{from_crypto_ohlc, from_csv_rows, from_stock_series, normalize};
pub use upload::{group_rows_by_symbol, UploadedRows};
pub use wire::{CryptoOhlcRow, CsvRow, StockBar, StockSeriesResponse};

/// One OHLCV price bar.
///
/// `time` is epoch seconds. Sequences produced by the normalizer are strictly
/// ascending by `time` (stocks + CSV paths) so they can be handed to a chart
/// in one bulk update. Unparseable rows are the exception: each one is kept at
/// [`INVALID_TIME`] at the front of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    /// Whether every field parsed cleanly.
    ///
    /// The normalizer is lenient on purpose; this is the hook for callers that
    /// want to filter before rendering.
    pub fn is_valid(&self) -> bool {
        self.time != INVALID_TIME
            && self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }

    /// Close time in epoch milliseconds, the unit signals are stamped with.
    pub fn time_millis(&self) -> i64 {
        self.time.saturating_mul(1000)
    }
}

/// Whether `candles` is strictly ascending by time (no duplicates).
pub fn is_strictly_ascending(candles: &[Candle]) -> bool {
    candles.windows(2).all(|w| w[0].time < w[1].time)
}
