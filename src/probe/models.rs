//! Probe data models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A candidate proxy under test
///
/// The port is carried verbatim from the source file; a non-numeric port
/// surfaces as a probe failure rather than a parse error, so entries are
/// never silently rewritten between loading and probing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: String,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
        }
    }

    /// Plain bracketed label, used for column-width math
    pub fn label(&self) -> String {
        format!("[{}:{}]", self.host, self.port)
    }

    /// URL of this endpoint when used as an HTTP forward proxy
    pub fn proxy_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Structured payload returned by the echo endpoint on a 200 response
///
/// Unknown fields are ignored; a missing `country` or `as` field makes the
/// body unparseable and the probe classifies as `MalformedResponse`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoInfo {
    pub country: String,
    #[serde(rename = "as")]
    pub autonomous_system: String,
}

/// Classification of a single probe, produced exactly once per endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// HTTP 200 with a parseable echo body
    Up { info: EchoInfo },
    /// HTTP 403
    Unauthorized,
    /// Any other terminal HTTP status
    OtherHttpError { status: u16 },
    /// The peer forcibly closed the connection
    ConnectionReset,
    /// The per-probe deadline elapsed without a response
    TimedOut,
    /// Unparseable 200 body, or a failure with no more specific category
    MalformedResponse,
}

impl ProbeOutcome {
    pub fn is_up(&self) -> bool {
        matches!(self, ProbeOutcome::Up { .. })
    }
}

/// Write-once record of one resolved probe
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub endpoint: Endpoint,
    pub outcome: ProbeOutcome,
    pub latency: Duration,
}

/// Running outcome counters for one run
///
/// Shared across concurrently resolving probes; each completed probe
/// records exactly one increment.
#[derive(Debug, Default)]
pub struct RunTally {
    up: AtomicUsize,
    timed_out: AtomicUsize,
    errored: AtomicUsize,
}

impl RunTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one resolved outcome
    pub fn record(&self, outcome: &ProbeOutcome) {
        let counter = match outcome {
            ProbeOutcome::Up { .. } => &self.up,
            ProbeOutcome::TimedOut => &self.timed_out,
            _ => &self.errored,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of probes that have resolved so far
    pub fn completed(&self) -> usize {
        self.up.load(Ordering::Relaxed)
            + self.timed_out.load(Ordering::Relaxed)
            + self.errored.load(Ordering::Relaxed)
    }

    /// Snapshot the counters into a summary
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            up: self.up.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            errored: self.errored.load(Ordering::Relaxed),
        }
    }
}

/// Final aggregate counts of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub up: usize,
    pub timed_out: usize,
    pub errored: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.up + self.timed_out + self.errored
    }
}
