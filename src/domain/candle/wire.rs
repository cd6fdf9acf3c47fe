//! Wire types for raw candle payloads (stocks API, crypto API, CSV rows).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::shared::serde_util::{lenient_f64, lenient_string};

fn nan() -> f64 {
    f64::NAN
}

/// Stocks time-series response.
///
/// Only the two series keys the chart uses are read; metadata and rate-limit
/// notes in the same object are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockSeriesResponse {
    #[serde(rename = "Time Series (5min)", default)]
    pub intraday: Option<BTreeMap<String, StockBar>>,
    #[serde(rename = "Time Series (Daily)", default)]
    pub daily: Option<BTreeMap<String, StockBar>>,
}

impl StockSeriesResponse {
    /// The preferred series: intraday when present, else daily.
    pub fn series(&self) -> Option<&BTreeMap<String, StockBar>> {
        self.intraday.as_ref().or(self.daily.as_ref())
    }
}

/// One field-labeled bar of a stocks time series.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StockBar {
    #[serde(rename = "1. open", default = "nan", deserialize_with = "lenient_f64::deserialize")]
    pub open: f64,
    #[serde(rename = "2. high", default = "nan", deserialize_with = "lenient_f64::deserialize")]
    pub high: f64,
    #[serde(rename = "3. low", default = "nan", deserialize_with = "lenient_f64::deserialize")]
    pub low: f64,
    #[serde(rename = "4. close", default = "nan", deserialize_with = "lenient_f64::deserialize")]
    pub close: f64,
    #[serde(rename = "5. volume", default = "nan", deserialize_with = "lenient_f64::deserialize")]
    pub volume: f64,
}

/// One crypto OHLC tuple `[time_ms, open, high, low, close]`.
///
/// Extra trailing elements are ignored, missing ones read as `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "Vec<Value>")]
pub struct CryptoOhlcRow {
    pub time_ms: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl From<Vec<Value>> for CryptoOhlcRow {
    fn from(values: Vec<Value>) -> Self {
        let at = |i: usize| {
            values
                .get(i)
                .map(lenient_f64::value_to_f64)
                .unwrap_or(f64::NAN)
        };
        Self {
            time_ms: at(0),
            open: at(1),
            high: at(2),
            low: at(3),
            close: at(4),
        }
    }
}

/// A parsed CSV row, all fields still text.
///
/// Also accepts the backend's stored chart rows, which name the timestamp
/// column `time` and carry numeric prices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CsvRow {
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub symbol: String,
    #[serde(alias = "time", default, deserialize_with = "lenient_string::deserialize")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub open: String,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub high: String,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub low: String,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub close: String,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub volume: String,
}

impl CsvRow {
    pub fn new(
        symbol: &str,
        timestamp: &str,
        open: &str,
        high: &str,
        low: &str,
        close: &str,
        volume: &str,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            timestamp: timestamp.to_string(),
            open: open.to_string(),
            high: high.to_string(),
            low: low.to_string(),
            close: close.to_string(),
            volume: volume.to_string(),
        }
    }
}
