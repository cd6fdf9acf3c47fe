//! Per-symbol "last seen alert" markers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::StoreError;
use crate::shared::Symbol;

/// Durable key-value store holding, per symbol, the epoch-millisecond
/// timestamp of the last alert the user has seen.
pub trait AlertMarkerStore: Send + Sync {
    fn get(&self, symbol: &Symbol) -> Result<Option<i64>, StoreError>;
    fn set(&self, symbol: &Symbol, epoch_millis: i64) -> Result<(), StoreError>;
}

/// Process-local store. Markers are lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryMarkerStore {
    markers: RwLock<HashMap<Symbol, i64>>,
}

impl InMemoryMarkerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlertMarkerStore for InMemoryMarkerStore {
    fn get(&self, symbol: &Symbol) -> Result<Option<i64>, StoreError> {
        let markers = self.markers.read().map_err(|_| StoreError::Poisoned)?;
        Ok(markers.get(symbol).copied())
    }

    fn set(&self, symbol: &Symbol, epoch_millis: i64) -> Result<(), StoreError> {
        let mut markers = self.markers.write().map_err(|_| StoreError::Poisoned)?;
        markers.insert(symbol.clone(), epoch_millis);
        Ok(())
    }
}

/// JSON-file store: `{"AAPL": 1704211200000, ...}`.
///
/// The file is read once on open and rewritten on every `set`. Writes go to a
/// sibling temp file first and are renamed into place.
#[derive(Debug)]
pub struct FileMarkerStore {
    path: PathBuf,
    markers: RwLock<HashMap<String, i64>>,
}

impl FileMarkerStore {
    /// Open `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let markers = match std::fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: path.display().to_string(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        tracing::debug!(path = %path.display(), count = markers.len(), "Opened alert marker file");
        Ok(Self {
            path,
            markers: RwLock::new(markers),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, markers: &HashMap<String, i64>) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        };

        let bytes = serde_json::to_vec_pretty(markers).map_err(|source| StoreError::Corrupt {
            path: self.path.display().to_string(),
            source,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, bytes).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl AlertMarkerStore for FileMarkerStore {
    fn get(&self, symbol: &Symbol) -> Result<Option<i64>, StoreError> {
        let markers = self.markers.read().map_err(|_| StoreError::Poisoned)?;
        Ok(markers.get(symbol.as_str()).copied())
    }

    fn set(&self, symbol: &Symbol, epoch_millis: i64) -> Result<(), StoreError> {
        let mut markers = self.markers.write().map_err(|_| StoreError::Poisoned)?;
        markers.insert(symbol.as_str().to_string(), epoch_millis);
        self.persist(&markers)
    }
}
