//! Signals sub-client: backend signal endpoints and the local strategy.

use crate::client::ChartdeskClient;
use crate::domain::candle::Candle;
use crate::domain::signal::{crossover_signals, signals_from_value, CrossoverConfig, RemoteEndpoint, Signal};
use crate::error::SdkError;
use crate::http::RetryPolicy;
use crate::shared::Symbol;

/// Sub-client for signal operations.
pub struct Signals<'a> {
    pub(crate) client: &'a ChartdeskClient,
}

impl<'a> Signals<'a> {
    /// Signals for a stock symbol (`/api/stock-signals`).
    pub async fn stock(&self, symbol: &Symbol) -> Result<Vec<Signal>, SdkError> {
        self.remote(RemoteEndpoint::Stock, symbol).await
    }

    /// Signals for a crypto symbol (`/api/crypto-signals`).
    pub async fn crypto(&self, symbol: &Symbol) -> Result<Vec<Signal>, SdkError> {
        self.remote(RemoteEndpoint::Crypto, symbol).await
    }

    pub async fn remote(
        &self,
        endpoint: RemoteEndpoint,
        symbol: &Symbol,
    ) -> Result<Vec<Signal>, SdkError> {
        endpoint
            .fetch(&self.client.http, symbol, None, RetryPolicy::Idempotent)
            .await
    }

    /// Most recent signals the backend has stored for `symbol`.
    pub async fn latest(&self, symbol: &Symbol) -> Result<Vec<Signal>, SdkError> {
        let value = self.client.http.get_latest_signals(symbol, None).await?;
        signals_from_value("/api/latest-signals", &value)
    }

    /// Signals computed on demand by the backend for `symbol`.
    pub async fn live(&self, symbol: &Symbol) -> Result<Vec<Signal>, SdkError> {
        let value = self.client.http.get_live_signals(symbol, None).await?;
        signals_from_value("/api/live-signals", &value)
    }

    /// Signals the backend generated from the last server-side upload.
    pub async fn uploaded(&self) -> Result<Vec<Signal>, SdkError> {
        let value = self.client.http.get_uploaded_signals(None).await?;
        signals_from_value("/api/signals", &value)
    }

    /// Run the crossover strategy over already-loaded candles.
    pub fn local(&self, candles: &[Candle], config: &CrossoverConfig) -> Vec<Signal> {
        crossover_signals(candles, config)
    }
}
