//! HTTP client layer: `ChartdeskHttp` with per-endpoint retry policies.

pub mod client;
pub mod retry;

pub use client::ChartdeskHttp;
pub use retry::{RetryConfig, RetryPolicy};
