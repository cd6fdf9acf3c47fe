//! Market feed: where a chart panel gets its candles and remote signals.
//!
//! [`MarketFeed`] is the seam between the chart controller and the outside
//! world. [`HttpMarketFeed`] is the production implementation; tests plug in
//! scripted feeds.

use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::Credential;
use crate::client::ChartdeskClient;
use crate::domain::candle::{from_csv_rows, normalize, Candle, CsvRow};
use crate::domain::signal::{RemoteEndpoint, Signal};
use crate::error::SdkError;
use crate::http::RetryPolicy;
use crate::network::CRYPTO_OHLC_DAYS;
use crate::shared::{DataSource, Symbol};

/// One fetch on behalf of a chart panel.
#[derive(Debug, Clone)]
pub struct FeedRequest {
    pub source: DataSource,
    pub symbol: Symbol,
    /// Bearer credential for this panel; `None` falls back to the client's.
    pub credential: Option<Credential>,
    /// Parsed rows for `csv-upload` panels.
    pub uploaded_rows: Option<Arc<Vec<CsvRow>>>,
    pub retry: RetryPolicy,
}

impl FeedRequest {
    pub fn new(source: DataSource, symbol: Symbol) -> Self {
        Self {
            source,
            symbol,
            credential: None,
            uploaded_rows: None,
            retry: RetryPolicy::Idempotent,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[async_trait]
pub trait MarketFeed: Send + Sync {
    /// Canonical candles for the request. Empty means "nothing to chart".
    async fn candles(&self, req: &FeedRequest) -> Result<Vec<Candle>, SdkError>;

    /// Signals from the backend signal service for a live source.
    async fn remote_signals(
        &self,
        endpoint: RemoteEndpoint,
        req: &FeedRequest,
    ) -> Result<Vec<Signal>, SdkError>;
}

/// [`MarketFeed`] backed by the chartdesk REST API.
#[derive(Clone)]
pub struct HttpMarketFeed {
    client: ChartdeskClient,
}

impl HttpMarketFeed {
    pub fn new(client: ChartdeskClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MarketFeed for HttpMarketFeed {
    async fn candles(&self, req: &FeedRequest) -> Result<Vec<Candle>, SdkError> {
        let http = &self.client.http;
        let auth = req.credential.as_ref();
        match req.source {
            DataSource::Stocks => {
                let value = http
                    .get_stock_series(&req.symbol, auth, req.retry.clone())
                    .await?;
                Ok(normalize(DataSource::Stocks, &value))
            }
            DataSource::Crypto => {
                let value = http
                    .get_crypto_ohlc(&req.symbol, CRYPTO_OHLC_DAYS, auth, req.retry.clone())
                    .await?;
                if !value.is_array() {
                    return Err(SdkError::ShapeMismatch {
                        endpoint: "/api/fetch-crypto-ohlc".to_string(),
                        expected: "array of OHLC tuples",
                    });
                }
                Ok(normalize(DataSource::Crypto, &value))
            }
            DataSource::CsvUpload => Ok(req
                .uploaded_rows
                .as_deref()
                .map(|rows| from_csv_rows(rows))
                .unwrap_or_default()),
            DataSource::Csv => Ok(Vec::new()),
        }
    }

    async fn remote_signals(
        &self,
        endpoint: RemoteEndpoint,
        req: &FeedRequest,
    ) -> Result<Vec<Signal>, SdkError> {
        endpoint
            .fetch(
                &self.client.http,
                &req.symbol,
                req.credential.as_ref(),
                req.retry.clone(),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_csv_upload_candles_need_no_network() {
        let client = ChartdeskClient::builder()
            .base_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        let feed = HttpMarketFeed::new(client);

        let rows = vec![
            CsvRow::new("AAPL", "2024-01-03", "2", "2", "2", "2", "10"),
            CsvRow::new("AAPL", "2024-01-02", "1", "1", "1", "1", "10"),
        ];
        let mut req = FeedRequest::new(DataSource::CsvUpload, Symbol::from("AAPL"));
        req.uploaded_rows = Some(Arc::new(rows));

        let candles = feed.candles(&req).await.unwrap();
        assert_eq!(candles.len(), 2);
        assert!(candles[0].time < candles[1].time);

        req.uploaded_rows = None;
        assert!(feed.candles(&req).await.unwrap().is_empty());
    }
}
