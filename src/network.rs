//! Network URL constants and environment keys for the chartdesk backend.

/// Default REST API base URL (local development backend).
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "CHARTDESK_API_URL";

/// Environment variable holding a bearer token for authenticated endpoints.
pub const TOKEN_ENV: &str = "CHARTDESK_TOKEN";

/// Days of crypto OHLC history requested for the live chart.
pub const CRYPTO_OHLC_DAYS: u32 = 1;
