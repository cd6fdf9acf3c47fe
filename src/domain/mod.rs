//! Domain modules: each a vertical slice of types, wire shapes, conversions
//! and the sub-client that fetches them.

pub mod alert;
pub mod candle;
pub mod signal;
