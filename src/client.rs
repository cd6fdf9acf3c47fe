//! High-level client: `ChartdeskClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder, the shared credential and accessor methods.

use crate::auth::Credential;
use crate::domain::alert::client::Alerts;
use crate::domain::candle::client::Candles;
use crate::domain::signal::client::Signals;
use crate::error::SdkError;
use crate::http::ChartdeskHttp;
use crate::network::{API_URL_ENV, DEFAULT_API_URL, TOKEN_ENV};

// Re-export sub-client types for convenience.
pub use crate::domain::alert::client::Alerts as AlertsClient;
pub use crate::domain::candle::client::Candles as CandlesClient;
pub use crate::domain::signal::client::Signals as SignalsClient;

/// The primary entry point for the chartdesk backend.
///
/// Provides nested sub-client accessors for each domain:
/// `client.candles()`, `client.signals()`, `client.alerts()`.
#[derive(Clone)]
pub struct ChartdeskClient {
    pub(crate) http: ChartdeskHttp,
}

impl ChartdeskClient {
    pub fn builder() -> ChartdeskClientBuilder {
        ChartdeskClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn candles(&self) -> Candles<'_> {
        Candles { client: self }
    }

    pub fn signals(&self) -> Signals<'_> {
        Signals { client: self }
    }

    pub fn alerts(&self) -> Alerts<'_> {
        Alerts { client: self }
    }

    /// Low-level HTTP client, for callers that need per-request credentials
    /// or retry policies.
    pub fn http(&self) -> &ChartdeskHttp {
        &self.http
    }

    /// Replace the client-wide bearer credential (`None` = signed out).
    pub async fn set_credential(&self, credential: Option<Credential>) {
        self.http.set_credential(credential).await;
    }

    pub async fn credential(&self) -> Option<Credential> {
        self.http.credential().await
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct ChartdeskClientBuilder {
    base_url: String,
    credential: Option<Credential>,
}

impl Default for ChartdeskClientBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            credential: None,
        }
    }
}

impl ChartdeskClientBuilder {
    /// Builder seeded from `CHARTDESK_API_URL` and `CHARTDESK_TOKEN`.
    ///
    /// Unset or blank variables fall back to the defaults.
    pub fn from_env() -> Self {
        let mut builder = Self::default();
        if let Some(url) = std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
        {
            builder.base_url = url.trim().to_string();
        }
        builder.credential = std::env::var(TOKEN_ENV).ok().and_then(Credential::new);
        builder
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Pre-set a bearer credential on construction.
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn build(self) -> Result<ChartdeskClient, SdkError> {
        let http = ChartdeskHttp::new(&self.base_url)?.with_credential(self.credential);
        tracing::debug!(base_url = %http.base_url(), "Built chartdesk client");
        Ok(ChartdeskClient { http })
    }
}
