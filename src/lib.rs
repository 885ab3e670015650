//! Proximus - Concurrent Proxy Checker
//!
//! Probes every proxy in a list through a single HTTP GET each and
//! classifies the outcome, with per-proxy latency measurement.

pub mod console;
pub mod format;
pub mod probe;

pub use probe::*;

/// Application result type
pub type Result<T> = anyhow::Result<T>;
