//! Probe module: endpoint loading, the concurrent engine, and its models
//!
//! This module provides functionality for:
//! - Loading and sanitizing `host:port` endpoint lists
//! - Probing every endpoint concurrently through one HTTP GET each
//! - Classifying outcomes and tallying them into a run summary

pub mod engine;
pub mod models;
pub mod source;

pub use engine::{
    classify_failure, classify_response, EngineConfig, NoProgress, ProbeEngine, ProgressSink,
    TransportFailure,
};
pub use models::{EchoInfo, Endpoint, ProbeOutcome, ProbeReport, RunSummary, RunTally};
pub use source::{load_endpoints, parse_line, parse_list, SourceOutcome};
