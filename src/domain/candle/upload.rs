//! Grouping of uploaded CSV rows by symbol.

use std::sync::Arc;

use super::wire::CsvRow;
use crate::shared::Symbol;

/// Uploaded rows grouped per symbol, in first-seen order.
///
/// Each group is shared behind an `Arc` so a panel can hold it as a dependency
/// without copying; a fresh upload produces fresh `Arc`s.
#[derive(Debug, Clone, Default)]
pub struct UploadedRows {
    groups: Vec<(Symbol, Arc<Vec<CsvRow>>)>,
}

impl UploadedRows {
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.groups.iter().map(|(symbol, _)| symbol)
    }

    pub fn rows(&self, symbol: &Symbol) -> Option<Arc<Vec<CsvRow>>> {
        self.groups
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, rows)| Arc::clone(rows))
    }

    /// The symbol a freshly uploaded file should select first.
    pub fn default_symbol(&self) -> Option<&Symbol> {
        self.groups.first().map(|(symbol, _)| symbol)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Group parsed rows by their `symbol` column.
///
/// Rows with a blank symbol are discarded.
pub fn group_rows_by_symbol(rows: impl IntoIterator<Item = CsvRow>) -> UploadedRows {
    let mut groups: Vec<(Symbol, Vec<CsvRow>)> = Vec::new();
    let mut dropped = 0usize;

    for row in rows {
        let key = row.symbol.trim();
        if key.is_empty() {
            dropped += 1;
            continue;
        }
        let symbol = Symbol::from(key);
        match groups.iter_mut().find(|(s, _)| *s == symbol) {
            Some((_, bucket)) => bucket.push(row),
            None => groups.push((symbol, vec![row])),
        }
    }

    if dropped > 0 {
        tracing::debug!("Dropped {} uploaded row(s) without a symbol", dropped);
    }

    UploadedRows {
        groups: groups
            .into_iter()
            .map(|(symbol, rows)| (symbol, Arc::new(rows)))
            .collect(),
    }
}
