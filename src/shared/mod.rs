//! Shared newtypes and utilities used across all domain modules.
//!
//! These types are serialization-transparent: they serialize/deserialize identically
//! to the raw format the backend and the dashboard selection use, so they can be
//! used directly in wire types without conversion overhead.

pub mod parse;
pub mod serde_util;

pub use parse::{parse_datetime_secs, parse_lenient_f64, INVALID_TIME};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

// ─── Symbol ──────────────────────────────────────────────────────────────────

/// Newtype for instrument symbols (e.g. `"AAPL"`, `"bitcoin"`).
///
/// Stored exactly as the user selected it. Endpoints that need a specific case
/// use [`Symbol::upper`] or [`Symbol::lower`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn upper(&self) -> String {
        self.0.to_uppercase()
    }

    pub fn lower(&self) -> String {
        self.0.to_lowercase()
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Symbol(s.to_string()))
    }
}

impl Serialize for Symbol {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Symbol(s))
    }
}

// ─── DataSource ──────────────────────────────────────────────────────────────

/// Where a panel's price history comes from.
///
/// Selects both the candle normalizer and the signal strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataSource {
    /// Server-side CSV upload panel. Not driven by the live controller.
    #[serde(rename = "csv")]
    Csv,
    /// Rows parsed client-side from an uploaded CSV file.
    #[serde(rename = "csv-upload")]
    CsvUpload,
    #[serde(rename = "stocks")]
    Stocks,
    #[serde(rename = "crypto")]
    Crypto,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::CsvUpload => "csv-upload",
            Self::Stocks => "stocks",
            Self::Crypto => "crypto",
        }
    }

    /// Whether the live chart controller renders this source.
    pub fn is_chartable(&self) -> bool {
        matches!(self, Self::CsvUpload | Self::Stocks | Self::Crypto)
    }

    /// Whether signals for this source come from a remote endpoint and are polled.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Stocks | Self::Crypto)
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a string is not one of the known data sources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown data source: {0}")]
pub struct UnknownDataSource(pub String);

impl FromStr for DataSource {
    type Err = UnknownDataSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(Self::Csv),
            "csv-upload" => Ok(Self::CsvUpload),
            "stocks" => Ok(Self::Stocks),
            "crypto" => Ok(Self::Crypto),
            other => Err(UnknownDataSource(other.to_string())),
        }
    }
}
