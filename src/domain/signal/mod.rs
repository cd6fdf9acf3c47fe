//! Signal domain: buy/sell indicators, local crossover strategy, remote fetch.

#[cfg(feature = "http")]
pub mod client;
pub mod crossover;
pub mod strategy;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::parse::parse_datetime_millis;
use crate::shared::Symbol;

pub use crossover::{crossover_signals, CrossoverConfig};
pub use strategy::{RemoteEndpoint, SignalStrategy};
pub use wire::signals_from_value;

/// Numeric timestamps at or above this magnitude are epoch milliseconds.
///
/// 10^11 seconds is year 5138; 10^11 milliseconds is March 1973. Anything a
/// market-data backend sends falls clearly on one side.
const MILLIS_THRESHOLD: f64 = 1e11;

/// Direction of a trade signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    #[serde(alias = "Buy", alias = "BUY")]
    Buy,
    #[serde(alias = "Sell", alias = "SELL")]
    Sell,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }

    /// Upper-cased label shown on chart markers and in lists.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Signal confidence: a plain number (`72.5`) or a percentage string (`"72.5%"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Confidence {
    Value(f64),
    Text(String),
}

impl Confidence {
    /// Confidence on the 0–100 scale, if it is numeric at all.
    pub fn percent(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v).filter(|v| v.is_finite()),
            Self::Text(s) => s
                .trim()
                .trim_end_matches('%')
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite()),
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{}%", v),
            Self::Text(s) if s.trim_end().ends_with('%') => write!(f, "{}", s.trim()),
            Self::Text(s) => write!(f, "{}%", s.trim()),
        }
    }
}

/// When a signal fired, in whatever representation its producer used.
///
/// The local strategy stamps epoch milliseconds, remote endpoints send ISO
/// strings or epoch seconds. Compare and format through [`epoch_millis`].
///
/// [`epoch_millis`]: SignalTimestamp::epoch_millis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalTimestamp {
    Numeric(f64),
    Text(String),
}

impl SignalTimestamp {
    pub fn from_millis(ms: i64) -> Self {
        Self::Numeric(ms as f64)
    }

    /// Normalized epoch milliseconds, or `None` when unparseable.
    pub fn epoch_millis(&self) -> Option<i64> {
        match self {
            Self::Numeric(n) => numeric_to_millis(*n),
            Self::Text(s) => match s.trim().parse::<f64>() {
                Ok(n) => numeric_to_millis(n),
                Err(_) => parse_datetime_millis(s),
            },
        }
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        self.epoch_millis().and_then(DateTime::<Utc>::from_timestamp_millis)
    }

    /// Marker position on a chart (epoch seconds).
    pub fn chart_time(&self) -> Option<i64> {
        self.epoch_millis().map(|ms| ms.div_euclid(1000))
    }
}

fn numeric_to_millis(n: f64) -> Option<i64> {
    if !n.is_finite() {
        return None;
    }
    if n.abs() >= MILLIS_THRESHOLD {
        Some(n.floor() as i64)
    } else {
        Some((n * 1000.0).floor() as i64)
    }
}

impl std::fmt::Display for SignalTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.to_datetime(), self) {
            (Some(dt), _) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S UTC")),
            (None, Self::Text(s)) => write!(f, "{}", s),
            (None, Self::Numeric(n)) => write!(f, "{}", n),
        }
    }
}

/// A trade indicator event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    #[serde(rename = "type")]
    pub kind: SignalType,
    pub confidence: Confidence,
    #[serde(alias = "time")]
    pub timestamp: SignalTimestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<Symbol>,
}

impl Signal {
    /// One-line human description, e.g. `BUY (70%) at 2024-01-02 00:00:00 UTC`.
    pub fn describe(&self) -> String {
        format!("{} ({}) at {}", self.kind.label(), self.confidence, self.timestamp)
    }
}

/// The latest signal: the last element as produced, not a max-by-time scan.
pub fn latest(signals: &[Signal]) -> Option<&Signal> {
    signals.last()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_type_case_insensitive() {
        let buy: SignalType = serde_json::from_str("\"Buy\"").unwrap();
        let sell: SignalType = serde_json::from_str("\"sell\"").unwrap();
        assert_eq!(buy, SignalType::Buy);
        assert_eq!(sell, SignalType::Sell);
        assert_eq!(buy.label(), "BUY");
    }

    #[test]
    fn test_timestamp_numeric_seconds_vs_millis() {
        let secs = SignalTimestamp::Numeric(1_700_000_000.0);
        let millis = SignalTimestamp::Numeric(1_700_000_000_000.0);
        assert_eq!(secs.epoch_millis(), Some(1_700_000_000_000));
        assert_eq!(millis.epoch_millis(), Some(1_700_000_000_000));
        assert_eq!(secs.chart_time(), Some(1_700_000_000));
    }

    #[test]
    fn test_timestamp_iso_string() {
        let ts: SignalTimestamp = serde_json::from_str("\"2024-01-02T16:00:00Z\"").unwrap();
        assert_eq!(ts.epoch_millis(), Some(1_704_211_200_000));
        assert_eq!(ts.to_string(), "2024-01-02 16:00:00 UTC");
    }

    #[test]
    fn test_timestamp_invalid_string() {
        let ts = SignalTimestamp::Text("yesterday".into());
        assert_eq!(ts.epoch_millis(), None);
        assert_eq!(ts.to_string(), "yesterday");
    }

    #[test]
    fn test_confidence_forms() {
        let num: Confidence = serde_json::from_str("72.5").unwrap();
        let text: Confidence = serde_json::from_str("\"72.5%\"").unwrap();
        assert_eq!(num.percent(), Some(72.5));
        assert_eq!(text.percent(), Some(72.5));
        assert_eq!(num.to_string(), "72.5%");
        assert_eq!(text.to_string(), "72.5%");
    }

    #[test]
    fn test_signal_accepts_backend_upload_shape() {
        let json = serde_json::json!({
            "id": 1, "symbol": "AAPL", "type": "Buy",
            "confidence": "3.2%", "time": "2024-01-02"
        });
        let sig: Signal = serde_json::from_value(json).unwrap();
        assert_eq!(sig.kind, SignalType::Buy);
        assert_eq!(sig.symbol, Some(Symbol::from("AAPL")));
        assert_eq!(sig.describe(), "BUY (3.2%) at 2024-01-02 00:00:00 UTC");
    }

    #[test]
    fn test_latest_is_last_element() {
        let early = Signal {
            kind: SignalType::Buy,
            confidence: Confidence::Value(70.0),
            timestamp: SignalTimestamp::from_millis(2_000_000_000_000),
            symbol: None,
        };
        let older_but_last = Signal {
            timestamp: SignalTimestamp::from_millis(1_000_000_000_000),
            kind: SignalType::Sell,
            ..early.clone()
        };
        let signals = vec![early, older_but_last];
        assert_eq!(latest(&signals).unwrap().kind, SignalType::Sell);
        assert!(latest(&[]).is_none());
    }
}
