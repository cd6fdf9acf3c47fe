//! # chartdesk
//!
//! Core of a market-data dashboard: candle normalization, trade signals, a
//! live chart controller and "new alert" projection.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core**: Candles, signals, alerts, chart state machine (always available)
//! 2. **Auth**: The bearer credential handed in by the embedding app
//! 3. **HTTP API**: `ChartdeskHttp` with per-endpoint retry policies
//! 4. **Live charting**: `MarketFeed` + `LiveChartController` on tokio
//! 5. **High-Level Client**: `ChartdeskClient` with nested sub-clients
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chartdesk::prelude::*;
//!
//! let client = ChartdeskClient::builder()
//!     .base_url("http://127.0.0.1:8000")
//!     .build()?;
//!
//! let candles = client.candles().stock(&Symbol::from("AAPL")).await?;
//! let signals = client.signals().stock(&Symbol::from("AAPL")).await?;
//!
//! let (width_tx, width_rx) = tokio::sync::watch::channel(800);
//! let mut chart = LiveChartController::new(
//!     Arc::new(HttpMarketFeed::new(client)),
//!     Arc::new(MySurfaceFactory),
//!     width_rx,
//!     ChartConfig::default(),
//! );
//! chart.update(PanelDeps::new(DataSource::Stocks, "AAPL"));
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes and lenient parsing helpers.
pub mod shared;

/// Domain modules (vertical slices): candles, signals, alerts.
pub mod domain;

/// Chart panel state machine, surface abstraction and controller.
pub mod chart;

/// Unified error types.
pub mod error;

/// Network URL constants.
pub mod network;

// ── Layer 2: Auth ────────────────────────────────────────────────────────────

/// Bearer credential.
pub mod auth;

// ── Layer 3: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 4: Live charting ───────────────────────────────────────────────────

/// `MarketFeed` seam and its HTTP implementation.
#[cfg(feature = "native")]
pub mod feed;

// ── Layer 5: High-Level Client ───────────────────────────────────────────────

/// `ChartdeskClient`: the primary entry point.
#[cfg(feature = "http")]
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{DataSource, Symbol};

    // Domain types: candle
    pub use crate::domain::candle::{
        group_rows_by_symbol, normalize, Candle, CsvRow, UploadedRows,
    };

    // Domain types: signal
    pub use crate::domain::signal::{
        crossover_signals, Confidence, CrossoverConfig, RemoteEndpoint, Signal, SignalStrategy,
        SignalTimestamp, SignalType,
    };

    // Domain types: alert
    pub use crate::domain::alert::{
        Alert, AlertMarkerStore, AlertProjector, FileMarkerStore, InMemoryMarkerStore,
    };

    // Chart
    pub use crate::chart::{
        reconcile, Action, CandleSeriesStyle, ChartConfig, ChartEvent, ChartOptions,
        ChartSnapshot, ChartState, ChartSurface, PanelDeps, PanelNotice, SeriesId, SeriesMarker,
        SurfaceFactory,
    };
    #[cfg(feature = "native")]
    pub use crate::chart::LiveChartController;

    // Errors
    pub use crate::error::{HttpError, SdkError, StoreError};

    // Network
    pub use crate::network::DEFAULT_API_URL;

    // Auth
    pub use crate::auth::Credential;

    // HTTP client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::client::{
        AlertsClient, CandlesClient, ChartdeskClient, ChartdeskClientBuilder, SignalsClient,
    };
    #[cfg(feature = "http")]
    pub use crate::http::retry::{RetryConfig, RetryPolicy};

    // Feed
    #[cfg(feature = "native")]
    pub use crate::feed::{FeedRequest, HttpMarketFeed, MarketFeed};
}
