//! Local moving-average crossover strategy.
//!
//! Used for uploaded CSV data, where no backend signal service knows about
//! the rows. Confidence is a fixed constant; the strategy makes no attempt to
//! grade crossings by magnitude.

use super::{Confidence, Signal, SignalTimestamp, SignalType};
use crate::domain::candle::Candle;
use crate::error::SdkError;

/// Window lengths and the constant confidence stamped on every signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossoverConfig {
    short_window: usize,
    long_window: usize,
    confidence: f64,
}

impl Default for CrossoverConfig {
    fn default() -> Self {
        Self {
            short_window: 3,
            long_window: 8,
            confidence: 70.0,
        }
    }
}

impl CrossoverConfig {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self, SdkError> {
        if short_window == 0 {
            return Err(SdkError::Validation("short window must be at least 1".into()));
        }
        if short_window >= long_window {
            return Err(SdkError::Validation(format!(
                "short window ({}) must be shorter than long window ({})",
                short_window, long_window
            )));
        }
        Ok(Self {
            short_window,
            long_window,
            ..Self::default()
        })
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

/// Simple moving average per index; `None` until `window` values are available.
fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        out.push((i + 1 >= window).then(|| sum / window as f64));
    }
    out
}

/// Emit buy/sell signals where the short SMA of closes crosses the long SMA.
///
/// Buy: short goes from `<=` long to `>` long. Sell: from `>=` to `<`.
/// Indices where either average (current or previous) is undefined are
/// skipped. Timestamps are the candle time in epoch milliseconds.
pub fn crossover_signals(candles: &[Candle], config: &CrossoverConfig) -> Vec<Signal> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let short = sma(&closes, config.short_window);
    let long = sma(&closes, config.long_window);

    let mut signals = Vec::new();
    for i in 1..candles.len() {
        let (Some(prev_s), Some(prev_l), Some(cur_s), Some(cur_l)) =
            (short[i - 1], long[i - 1], short[i], long[i])
        else {
            continue;
        };

        let kind = if prev_s <= prev_l && cur_s > cur_l {
            SignalType::Buy
        } else if prev_s >= prev_l && cur_s < cur_l {
            SignalType::Sell
        } else {
            continue;
        };

        signals.push(Signal {
            kind,
            confidence: Confidence::Value(config.confidence),
            timestamp: SignalTimestamp::from_millis(candles[i].time_millis()),
            symbol: None,
        });
    }
    signals
}
