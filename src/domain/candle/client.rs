//! Candles sub-client: market-data proxies and the server-side upload.

use serde::Deserialize;

use crate::client::ChartdeskClient;
use crate::domain::candle::{group_rows_by_symbol, normalize, Candle, CsvRow, UploadedRows};
use crate::error::SdkError;
use crate::http::RetryPolicy;
use crate::network::CRYPTO_OHLC_DAYS;
use crate::shared::{DataSource, Symbol};

/// Sub-client for candle data.
pub struct Candles<'a> {
    pub(crate) client: &'a ChartdeskClient,
}

impl<'a> Candles<'a> {
    /// Stock candles, ascending. An unrecognized payload gives an empty vec.
    pub async fn stock(&self, symbol: &Symbol) -> Result<Vec<Candle>, SdkError> {
        let value = self
            .client
            .http
            .get_stock_series(symbol, None, RetryPolicy::Idempotent)
            .await?;
        Ok(normalize(DataSource::Stocks, &value))
    }

    /// Crypto candles in source order.
    ///
    /// The proxy answers errors as JSON objects with a 200 status, so a
    /// non-array body is reported as a shape mismatch.
    pub async fn crypto(&self, symbol: &Symbol) -> Result<Vec<Candle>, SdkError> {
        let value = self
            .client
            .http
            .get_crypto_ohlc(symbol, CRYPTO_OHLC_DAYS, None, RetryPolicy::Idempotent)
            .await?;
        if !value.is_array() {
            return Err(SdkError::ShapeMismatch {
                endpoint: "/api/fetch-crypto-ohlc".to_string(),
                expected: "array of OHLC tuples",
            });
        }
        Ok(normalize(DataSource::Crypto, &value))
    }

    /// Rows the backend stored from its last CSV upload, grouped by symbol.
    pub async fn chart_data(&self) -> Result<UploadedRows, SdkError> {
        let value = self.client.http.get_chart_data(None).await?;
        if !value.is_array() {
            return Err(SdkError::ShapeMismatch {
                endpoint: "/api/chart-data".to_string(),
                expected: "array of rows",
            });
        }
        let rows = Vec::<CsvRow>::deserialize(&value)?;
        Ok(group_rows_by_symbol(rows))
    }
}
