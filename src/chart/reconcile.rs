//! Panel dependencies and the reconcile step that turns a change of
//! dependencies into controller actions.

use std::sync::Arc;

use crate::auth::Credential;
use crate::domain::candle::CsvRow;
use crate::shared::{DataSource, Symbol};

/// Everything a chart panel's content depends on.
///
/// Two values are equal when source, symbol and credential are equal and the
/// uploaded rows are the *same* allocation. Re-uploading identical content is
/// still a change.
#[derive(Debug, Clone, Default)]
pub struct PanelDeps {
    pub source: Option<DataSource>,
    pub symbol: Symbol,
    pub credential: Option<Credential>,
    pub uploaded_rows: Option<Arc<Vec<CsvRow>>>,
}

impl PanelDeps {
    pub fn new(source: DataSource, symbol: impl Into<Symbol>) -> Self {
        Self {
            source: Some(source),
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }

    pub fn with_uploaded_rows(mut self, rows: Arc<Vec<CsvRow>>) -> Self {
        self.uploaded_rows = Some(rows);
        self
    }

    /// A chart is shown: the symbol is non-blank and the source is chartable.
    pub fn is_active(&self) -> bool {
        !self.symbol.is_empty() && self.source.is_some_and(|s| s.is_chartable())
    }

    /// Active and backed by a live market-data source (polled).
    pub fn is_live(&self) -> bool {
        self.is_active() && self.source.is_some_and(|s| s.is_live())
    }
}

impl PartialEq for PanelDeps {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.symbol == other.symbol
            && self.credential == other.credential
            && match (&self.uploaded_rows, &other.uploaded_rows) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

/// A step the controller performs, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StopPoll,
    DisposeSurface,
    CreateSurface,
    FetchCandles,
    FetchSignals,
    StartPoll,
}

/// Compute the actions that move a panel from `prev` to `next`.
///
/// Unchanged dependencies produce nothing. Any change tears down what `prev`
/// had running, then builds from scratch for `next` if it is active.
pub fn reconcile(prev: Option<&PanelDeps>, next: &PanelDeps) -> Vec<Action> {
    if prev == Some(next) {
        return Vec::new();
    }

    let mut actions = Vec::new();
    if let Some(prev) = prev.filter(|p| p.is_active()) {
        if prev.is_live() {
            actions.push(Action::StopPoll);
        }
        actions.push(Action::DisposeSurface);
    }

    if next.is_active() {
        actions.extend([Action::CreateSurface, Action::FetchCandles, Action::FetchSignals]);
        if next.is_live() {
            actions.push(Action::StartPoll);
        }
    }
    actions
}
