//! Live chart panel: one controller per mounted panel, driving an abstract
//! rendering surface from a [`MarketFeed`](crate::feed::MarketFeed).
//!
//! The controller is an explicit state machine. Every dependency change is run
//! through [`reconcile`] and the resulting actions are applied in order:
//! teardown first, then a full rebuild.
//!
//! ```text
//! Idle ──update──▶ Loading ──candles + signals──▶ Rendered
//!                     │                              │
//!                     └──no candles / error──▶ Failed │
//!                                                    ▼
//!            any dependency change ──▶ Loading (full rebuild)
//! ```

#[cfg(feature = "native")]
pub mod controller;
pub mod marker;
pub mod reconcile;
pub mod surface;

use std::time::Duration;

use crate::domain::alert::Alert;
use crate::domain::signal::{CrossoverConfig, Signal};
use crate::error::SdkError;
use crate::shared::Symbol;

#[cfg(feature = "native")]
pub use controller::LiveChartController;
pub use marker::{markers_from_signals, MarkerPosition, MarkerShape, MarkerStyle, SeriesMarker};
pub use reconcile::{reconcile, Action, PanelDeps};
pub use surface::{
    CandleSeriesStyle, ChartOptions, ChartSurface, ChartTheme, SeriesId, SurfaceFactory,
};

/// Default chart height in pixels.
pub const DEFAULT_HEIGHT: u32 = 320;

/// Default interval between signal polls for live sources.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(90);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartState {
    /// No surface. Either never mounted or the inputs select nothing.
    Idle,
    /// Surface created, data in flight.
    Loading,
    /// Candles drawn and the signal overlay applied.
    Rendered,
    /// Nothing to draw this cycle; see the panel notice.
    Failed,
}

impl ChartState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Rendered => "rendered",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ChartState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A non-fatal, user-visible problem with the current render cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelNotice {
    NoCandles { symbol: Symbol },
    UnexpectedShape { endpoint: String },
    FetchFailed { message: String },
}

impl PanelNotice {
    pub(crate) fn from_error(err: &SdkError) -> Self {
        match err {
            SdkError::ShapeMismatch { endpoint, .. } => Self::UnexpectedShape {
                endpoint: endpoint.clone(),
            },
            other => Self::FetchFailed {
                message: other.to_string(),
            },
        }
    }
}

impl std::fmt::Display for PanelNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoCandles { symbol } => write!(f, "No candle data available for {}", symbol),
            Self::UnexpectedShape { endpoint } => {
                write!(f, "Backend returned unexpected data from {}", endpoint)
            }
            Self::FetchFailed { message } => write!(f, "Failed to load chart data: {}", message),
        }
    }
}

/// Events emitted by a [`LiveChartController`].
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    StateChanged(ChartState),
    Notice(PanelNotice),
    /// The marker overlay was replaced, from the initial load or a poll.
    SignalsUpdated { symbol: Symbol, signals: Vec<Signal> },
    /// Projection of the latest signal; check `alert.is_new`.
    Alert { symbol: Symbol, alert: Alert },
}

/// Controller settings.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub height: u32,
    pub poll_interval: Duration,
    /// Strategy for `csv-upload` panels.
    pub crossover: CrossoverConfig,
    pub markers: MarkerStyle,
    pub series_style: CandleSeriesStyle,
    pub theme: ChartTheme,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            height: DEFAULT_HEIGHT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            crossover: CrossoverConfig::default(),
            markers: MarkerStyle::default(),
            series_style: CandleSeriesStyle::default(),
            theme: ChartTheme::default(),
        }
    }
}

/// Point-in-time view of a controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSnapshot {
    pub state: ChartState,
    pub notice: Option<PanelNotice>,
    pub generation: u64,
    pub has_surface: bool,
    pub poll_active: bool,
    pub candle_count: usize,
    pub signals: Vec<Signal>,
}

impl ChartSnapshot {
    /// Latest signal as shown under the chart (last element).
    pub fn latest_signal(&self) -> Option<&Signal> {
        crate::domain::signal::latest(&self.signals)
    }
}
