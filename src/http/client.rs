//! Low-level HTTP client: `ChartdeskHttp`.
//!
//! One method per API endpoint. Returns raw JSON (`serde_json::Value`) for the
//! market-data endpoints because their shapes are checked and normalized by the
//! domain layer, never trusted at the transport boundary.

use crate::auth::Credential;
use crate::error::HttpError;
use crate::http::retry::RetryPolicy;
use crate::shared::Symbol;

use async_lock::RwLock;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

/// Low-level HTTP client for the chartdesk REST API.
#[derive(Clone)]
pub struct ChartdeskHttp {
    base_url: String,
    client: Client,
    /// Client-wide credential, used when a call does not pass its own.
    credential: Arc<RwLock<Option<Credential>>>,
}

impl ChartdeskHttp {
    pub fn new(base_url: &str) -> Result<Self, HttpError> {
        let mut builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        {
            builder = builder
                .timeout(Duration::from_secs(30))
                .pool_max_idle_per_host(10);
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
            credential: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Seed the client-wide credential at construction time.
    pub(crate) fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = Arc::new(RwLock::new(credential));
        self
    }

    pub(crate) async fn set_credential(&self, credential: Option<Credential>) {
        *self.credential.write().await = credential;
    }

    pub(crate) async fn credential(&self) -> Option<Credential> {
        self.credential.read().await.clone()
    }

    // ── Candles ──────────────────────────────────────────────────────────

    /// Stocks time series for `symbol` (upper-cased on the wire).
    pub async fn get_stock_series(
        &self,
        symbol: &Symbol,
        auth: Option<&Credential>,
        retry: RetryPolicy,
    ) -> Result<Value, HttpError> {
        let url = format!(
            "{}/api/fetch-stock?symbol={}",
            self.base_url,
            urlencoding::encode(&symbol.upper())
        );
        self.get(&url, auth, retry).await
    }

    /// Crypto OHLC tuples for `symbol` (lower-cased on the wire).
    pub async fn get_crypto_ohlc(
        &self,
        symbol: &Symbol,
        days: u32,
        auth: Option<&Credential>,
        retry: RetryPolicy,
    ) -> Result<Value, HttpError> {
        let url = format!(
            "{}/api/fetch-crypto-ohlc?symbol={}&days={}",
            self.base_url,
            urlencoding::encode(&symbol.lower()),
            days
        );
        self.get(&url, auth, retry).await
    }

    /// Rows stored by the backend from the last server-side CSV upload.
    pub async fn get_chart_data(&self, auth: Option<&Credential>) -> Result<Value, HttpError> {
        let url = format!("{}/api/chart-data", self.base_url);
        self.get(&url, auth, RetryPolicy::Idempotent).await
    }

    // ── Signals ──────────────────────────────────────────────────────────

    pub async fn get_stock_signals(
        &self,
        symbol: &Symbol,
        auth: Option<&Credential>,
        retry: RetryPolicy,
    ) -> Result<Value, HttpError> {
        let url = format!(
            "{}/api/stock-signals?symbol={}",
            self.base_url,
            urlencoding::encode(&symbol.upper())
        );
        self.get(&url, auth, retry).await
    }

    pub async fn get_crypto_signals(
        &self,
        symbol: &Symbol,
        auth: Option<&Credential>,
        retry: RetryPolicy,
    ) -> Result<Value, HttpError> {
        let url = format!(
            "{}/api/crypto-signals?symbol={}",
            self.base_url,
            urlencoding::encode(&symbol.lower())
        );
        self.get(&url, auth, retry).await
    }

    pub async fn get_latest_signals(
        &self,
        symbol: &Symbol,
        auth: Option<&Credential>,
    ) -> Result<Value, HttpError> {
        let url = format!(
            "{}/api/latest-signals?symbol={}",
            self.base_url,
            urlencoding::encode(&symbol.upper())
        );
        self.get(&url, auth, RetryPolicy::Idempotent).await
    }

    pub async fn get_live_signals(
        &self,
        symbol: &Symbol,
        auth: Option<&Credential>,
    ) -> Result<Value, HttpError> {
        let url = format!(
            "{}/api/live-signals?symbol={}",
            self.base_url,
            urlencoding::encode(symbol.as_str())
        );
        self.get(&url, auth, RetryPolicy::Idempotent).await
    }

    /// Signals the backend generated from the last server-side CSV upload.
    pub async fn get_uploaded_signals(
        &self,
        auth: Option<&Credential>,
    ) -> Result<Value, HttpError> {
        let url = format!("{}/api/signals", self.base_url);
        self.get(&url, auth, RetryPolicy::Idempotent).await
    }

    // ── Alerts ───────────────────────────────────────────────────────────

    pub async fn get_alerts(&self, auth: Option<&Credential>) -> Result<Value, HttpError> {
        let url = format!("{}/api/alerts", self.base_url);
        self.get(&url, auth, RetryPolicy::Idempotent).await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        auth: Option<&Credential>,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        let Some(config) = retry.config() else {
            return self.do_get(url, auth).await;
        };

        let mut last_error = None;

        for attempt in 0..=config.max_retries {
            match self.do_get::<T>(url, auth).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    if !(config.should_retry(&e) && attempt < config.max_retries) {
                        return Err(e);
                    }

                    let delay = config.delay_for_error(&e, attempt);
                    tracing::debug!(
                        attempt = attempt + 1,
                        max = config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying request to {}",
                        url
                    );
                    futures_timer::Delay::new(delay).await;
                    last_error = Some(e);
                }
            }
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_get<T: DeserializeOwned>(
        &self,
        url: &str,
        auth: Option<&Credential>,
    ) -> Result<T, HttpError> {
        let mut req = self.client.get(url);

        let stored = match auth {
            Some(_) => None,
            None => self.credential().await,
        };
        if let Some(credential) = auth.or(stored.as_ref()) {
            req = req.header(reqwest::header::AUTHORIZATION, credential.bearer_header());
        }

        let resp = req.send().await?;
        let status = resp.status();

        if status.is_success() {
            let parsed = resp.json::<T>().await?;
            return Ok(parsed);
        }

        let status_code = status.as_u16();
        let retry_after_ms = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| secs.saturating_mul(1000));
        let body_text = resp.text().await.unwrap_or_default();

        match status_code {
            401 => Err(HttpError::Unauthorized),
            404 => Err(HttpError::NotFound(body_text)),
            429 => Err(HttpError::RateLimited { retry_after_ms }),
            400..=499 => Err(HttpError::BadRequest(body_text)),
            _ => Err(HttpError::ServerError {
                status: status_code,
                body: body_text,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let http = ChartdeskHttp::new("http://localhost:8000/").unwrap();
        assert_eq!(http.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn test_credential_round_trip() {
        let http = ChartdeskHttp::new("http://localhost:8000").unwrap();
        assert!(http.credential().await.is_none());
        http.set_credential(Credential::new("tok")).await;
        assert_eq!(http.credential().await, Credential::new("tok"));
    }
}
