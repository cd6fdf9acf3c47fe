//! Signal → chart marker projection.

use serde::Serialize;

use crate::domain::signal::{Signal, SignalType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerPosition {
    BelowBar,
    AboveBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerShape {
    ArrowUp,
    ArrowDown,
}

/// A directional annotation on a candle series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesMarker {
    /// Epoch seconds, matching candle time.
    pub time: i64,
    pub position: MarkerPosition,
    pub shape: MarkerShape,
    pub color: String,
    pub text: String,
}

/// Marker colors.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub buy_color: String,
    pub sell_color: String,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            buy_color: "#22c55e".to_string(),
            sell_color: "#ef4444".to_string(),
        }
    }
}

impl MarkerStyle {
    pub fn marker_for(&self, signal: &Signal) -> Option<SeriesMarker> {
        let time = signal.timestamp.chart_time()?;
        let (position, shape, color) = match signal.kind {
            SignalType::Buy => (MarkerPosition::BelowBar, MarkerShape::ArrowUp, &self.buy_color),
            SignalType::Sell => (MarkerPosition::AboveBar, MarkerShape::ArrowDown, &self.sell_color),
        };
        Some(SeriesMarker {
            time,
            position,
            shape,
            color: color.clone(),
            text: signal.kind.label().to_string(),
        })
    }
}

/// Project signals onto markers, ascending by time.
///
/// Signals whose timestamp cannot be placed on the time axis are skipped.
pub fn markers_from_signals(signals: &[Signal], style: &MarkerStyle) -> Vec<SeriesMarker> {
    let mut markers: Vec<SeriesMarker> = signals
        .iter()
        .filter_map(|signal| {
            let marker = style.marker_for(signal);
            if marker.is_none() {
                tracing::debug!(timestamp = %signal.timestamp, "Skipping marker with unplaceable timestamp");
            }
            marker
        })
        .collect();
    markers.sort_by_key(|m| m.time);
    markers
}
