//! Rendering surface abstraction.
//!
//! The controller never talks to a concrete chart library. An embedder
//! implements [`SurfaceFactory`] and [`ChartSurface`] over whatever draws the
//! candles (a webview bridge, a native widget, a test recorder).

use serde::Serialize;

use super::marker::SeriesMarker;
use crate::domain::candle::Candle;

/// Opaque handle to a series on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SeriesId(pub u32);

/// Colors of the chart frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartTheme {
    pub background_color: String,
    pub text_color: String,
    pub grid_color: String,
    pub border_color: String,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            background_color: "#1e293b".to_string(),
            text_color: "#d1d5db".to_string(),
            grid_color: "#334155".to_string(),
            border_color: "#475569".to_string(),
        }
    }
}

/// Options a surface is created with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    /// Container width in pixels at creation time.
    pub width: u32,
    pub height: u32,
    pub theme: ChartTheme,
    /// Show hours and minutes on the time axis.
    pub time_visible: bool,
    pub seconds_visible: bool,
}

/// Candlestick series colors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandleSeriesStyle {
    pub up_color: String,
    pub down_color: String,
    pub border_up_color: String,
    pub border_down_color: String,
    pub wick_up_color: String,
    pub wick_down_color: String,
}

impl CandleSeriesStyle {
    pub fn two_tone(up: &str, down: &str) -> Self {
        Self {
            up_color: up.to_string(),
            down_color: down.to_string(),
            border_up_color: up.to_string(),
            border_down_color: down.to_string(),
            wick_up_color: up.to_string(),
            wick_down_color: down.to_string(),
        }
    }
}

impl Default for CandleSeriesStyle {
    fn default() -> Self {
        Self::two_tone("#22c55e", "#ef4444")
    }
}

/// One live chart instance.
///
/// Calls are synchronous; an implementation that renders on another thread
/// should queue them.
pub trait ChartSurface: Send {
    fn add_candle_series(&mut self, style: &CandleSeriesStyle) -> SeriesId;

    /// Replace the whole series in one bulk update.
    fn set_series_data(&mut self, series: SeriesId, candles: &[Candle]);

    /// Replace every marker on the series. An empty slice clears the overlay.
    fn set_series_markers(&mut self, series: SeriesId, markers: &[SeriesMarker]);

    fn apply_width(&mut self, width: u32);

    /// Release the surface. No other method is called afterwards.
    fn remove(&mut self);
}

/// Creates surfaces for the controller.
pub trait SurfaceFactory: Send + Sync {
    fn create(&self, options: &ChartOptions) -> Box<dyn ChartSurface>;
}
