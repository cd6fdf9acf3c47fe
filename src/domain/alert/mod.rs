//! Alert domain: "is the latest signal new since the user last looked".

#[cfg(feature = "http")]
pub mod client;
pub mod store;

use std::sync::Arc;

use crate::domain::signal::{latest, Signal};
use crate::error::SdkError;
use crate::shared::Symbol;

pub use store::{AlertMarkerStore, FileMarkerStore, InMemoryMarkerStore};

/// The latest signal for a symbol, flagged when it has not been seen before.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub signal: Signal,
    pub is_new: bool,
}

impl Alert {
    pub fn message(&self, symbol: &Symbol) -> String {
        format!("{}: {}", symbol, self.signal.describe())
    }
}

/// Projects signal sequences onto per-symbol alerts.
#[derive(Clone)]
pub struct AlertProjector {
    store: Arc<dyn AlertMarkerStore>,
}

impl AlertProjector {
    pub fn new(store: Arc<dyn AlertMarkerStore>) -> Self {
        Self { store }
    }

    /// Projector over a fresh process-local store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryMarkerStore::new()))
    }

    /// Inspect the latest (last) signal for `symbol`.
    ///
    /// Returns `None` for an empty sequence. The signal is new when no marker
    /// exists for the symbol or the stored marker is strictly older; in that
    /// case the marker advances to the signal's timestamp. A signal whose
    /// timestamp cannot be parsed is reported as not new and leaves the marker
    /// untouched.
    pub fn project(&self, symbol: &Symbol, signals: &[Signal]) -> Result<Option<Alert>, SdkError> {
        let Some(signal) = latest(signals) else {
            return Ok(None);
        };

        let Some(ms) = signal.timestamp.epoch_millis() else {
            tracing::warn!(%symbol, timestamp = %signal.timestamp, "Latest signal has unparseable timestamp");
            return Ok(Some(Alert {
                signal: signal.clone(),
                is_new: false,
            }));
        };

        let is_new = match self.store.get(symbol)? {
            Some(seen) => ms > seen,
            None => true,
        };
        if is_new {
            self.store.set(symbol, ms)?;
            tracing::info!(%symbol, "New alert: {}", signal.describe());
        }

        Ok(Some(Alert {
            signal: signal.clone(),
            is_new,
        }))
    }

    pub fn store(&self) -> &Arc<dyn AlertMarkerStore> {
        &self.store
    }
}

impl std::fmt::Debug for AlertProjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertProjector").finish_non_exhaustive()
    }
}
