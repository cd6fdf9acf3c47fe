//! Signal strategy selection by data source.

use super::crossover::{crossover_signals, CrossoverConfig};
use super::Signal;
use crate::domain::candle::Candle;
use crate::shared::DataSource;

#[cfg(feature = "http")]
use super::wire::signals_from_value;
#[cfg(feature = "http")]
use crate::auth::Credential;
#[cfg(feature = "http")]
use crate::error::SdkError;
#[cfg(feature = "http")]
use crate::http::{ChartdeskHttp, RetryPolicy};
#[cfg(feature = "http")]
use crate::shared::Symbol;

/// Backend signal endpoint for a live source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteEndpoint {
    /// `/api/stock-signals`, symbol upper-cased.
    Stock,
    /// `/api/crypto-signals`, symbol lower-cased.
    Crypto,
}

impl RemoteEndpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Stock => "/api/stock-signals",
            Self::Crypto => "/api/crypto-signals",
        }
    }

    #[cfg(feature = "http")]
    pub async fn fetch(
        &self,
        http: &ChartdeskHttp,
        symbol: &Symbol,
        auth: Option<&Credential>,
        retry: RetryPolicy,
    ) -> Result<Vec<Signal>, SdkError> {
        let value = match self {
            Self::Stock => http.get_stock_signals(symbol, auth, retry).await?,
            Self::Crypto => http.get_crypto_signals(symbol, auth, retry).await?,
        };
        signals_from_value(self.path(), &value)
    }
}

/// How signals are produced for a panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalStrategy {
    /// Moving-average crossover computed over the rendered candles.
    Local(CrossoverConfig),
    /// Delegated to the backend signal service.
    Remote(RemoteEndpoint),
}

impl SignalStrategy {
    /// `csv-upload` computes locally, `stocks`/`crypto` ask the backend,
    /// `csv` has no chart and therefore no strategy.
    pub fn for_source(source: DataSource, config: &CrossoverConfig) -> Option<Self> {
        match source {
            DataSource::CsvUpload => Some(Self::Local(*config)),
            DataSource::Stocks => Some(Self::Remote(RemoteEndpoint::Stock)),
            DataSource::Crypto => Some(Self::Remote(RemoteEndpoint::Crypto)),
            DataSource::Csv => None,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Compute locally; `None` for remote strategies.
    pub fn compute_local(&self, candles: &[Candle]) -> Option<Vec<Signal>> {
        match self {
            Self::Local(config) => Some(crossover_signals(candles, config)),
            Self::Remote(_) => None,
        }
    }

    /// Produce signals: locally from `candles`, or from the backend for `symbol`.
    #[cfg(feature = "http")]
    pub async fn run(
        &self,
        http: &ChartdeskHttp,
        symbol: &Symbol,
        candles: &[Candle],
        auth: Option<&Credential>,
        retry: RetryPolicy,
    ) -> Result<Vec<Signal>, SdkError> {
        match self {
            Self::Local(config) => Ok(crossover_signals(candles, config)),
            Self::Remote(endpoint) => endpoint.fetch(http, symbol, auth, retry).await,
        }
    }
}
