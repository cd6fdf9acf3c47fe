//! Conversions from raw payloads to canonical candles.

use serde::Deserialize;
use serde_json::Value;

use super::wire::{CryptoOhlcRow, CsvRow, StockSeriesResponse};
use super::Candle;
use crate::shared::parse::millis_to_secs;
use crate::shared::{parse_datetime_secs, parse_lenient_f64, DataSource, INVALID_TIME};

/// Normalize a raw JSON payload for `source` into candles.
///
/// An empty or unrecognized payload yields an empty vec; that is the signal
/// to render nothing, not an error.
pub fn normalize(source: DataSource, payload: &Value) -> Vec<Candle> {
    match source {
        DataSource::Stocks => match StockSeriesResponse::deserialize(payload) {
            Ok(resp) => from_stock_series(&resp),
            Err(e) => {
                tracing::debug!("Unrecognized stocks payload: {}", e);
                Vec::new()
            }
        },
        DataSource::Crypto => match Vec::<CryptoOhlcRow>::deserialize(payload) {
            Ok(rows) => from_crypto_ohlc(&rows),
            Err(e) => {
                tracing::debug!("Unrecognized crypto OHLC payload: {}", e);
                Vec::new()
            }
        },
        DataSource::CsvUpload | DataSource::Csv => match Vec::<CsvRow>::deserialize(payload) {
            Ok(rows) => from_csv_rows(&rows),
            Err(e) => {
                tracing::debug!("Unrecognized CSV row payload: {}", e);
                Vec::new()
            }
        },
    }
}

/// Stocks time series → candles, sorted ascending.
pub fn from_stock_series(resp: &StockSeriesResponse) -> Vec<Candle> {
    let Some(series) = resp.series() else {
        return Vec::new();
    };

    let candles = series
        .iter()
        .map(|(timestamp, bar)| Candle {
            time: parse_datetime_secs(timestamp).unwrap_or(INVALID_TIME),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        })
        .collect();

    sort_and_dedup(candles)
}

/// Crypto OHLC tuples → candles.
///
/// The endpoint returns rows oldest-first, so source order is kept as-is.
pub fn from_crypto_ohlc(rows: &[CryptoOhlcRow]) -> Vec<Candle> {
    rows.iter()
        .map(|row| Candle {
            time: millis_to_secs(row.time_ms),
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: 0.0,
        })
        .collect()
}

/// CSV rows → candles, sorted ascending.
///
/// Rows with an unparseable timestamp are all kept at [`INVALID_TIME`], ahead
/// of the valid ones.
pub fn from_csv_rows(rows: &[CsvRow]) -> Vec<Candle> {
    let candles = rows
        .iter()
        .map(|row| Candle {
            time: parse_datetime_secs(&row.timestamp).unwrap_or(INVALID_TIME),
            open: parse_lenient_f64(&row.open),
            high: parse_lenient_f64(&row.high),
            low: parse_lenient_f64(&row.low),
            close: parse_lenient_f64(&row.close),
            volume: parse_lenient_f64(&row.volume),
        })
        .collect();

    sort_and_dedup(candles)
}

/// Stable sort by time; for repeated times the row seen last wins.
/// Candles at [`INVALID_TIME`] are never merged.
fn sort_and_dedup(mut candles: Vec<Candle>) -> Vec<Candle> {
    candles.sort_by_key(|c| c.time);

    let mut out: Vec<Candle> = Vec::with_capacity(candles.len());
    for candle in candles {
        match out.last_mut() {
            Some(last) if last.time == candle.time && candle.time != INVALID_TIME => {
                *last = candle
            }
            _ => out.push(candle),
        }
    }
    out
}
