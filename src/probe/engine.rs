//! Probe engine: one concurrent HTTP check per endpoint

use crate::console;
use crate::format::format_duration;
use crate::probe::models::{Endpoint, ProbeOutcome, ProbeReport, RunSummary, RunTally};
use crate::Result;
use futures::future;
use reqwest::{Client, Proxy, StatusCode};
use std::error::Error as StdError;
use std::io;
use std::time::{Duration, Instant};

/// Default deadline for each probe in milliseconds
const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default echo endpoint fetched through each candidate proxy
const DEFAULT_PROBE_URL: &str = "http://ip-api.com/json/";

/// Observer notified after each probe resolves
///
/// Keeps progress reporting out of the engine: the caller decides whether
/// completions drive a terminal title, a progress bar, or nothing.
pub trait ProgressSink: Send + Sync {
    fn probe_completed(&self, done: usize, total: usize);
}

/// Sink that ignores progress, for callers without a display
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn probe_completed(&self, _done: usize, _total: usize) {}
}

/// Failure category reported by the transport layer
///
/// Decided exactly once, at the boundary between the request call and
/// classification; nothing downstream re-inspects error strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    TimedOut,
    Reset,
    Other,
}

impl TransportFailure {
    fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::TimedOut;
        }

        let mut cause = err.source();
        while let Some(inner) = cause {
            if let Some(io_err) = inner.downcast_ref::<io::Error>() {
                if io_err.kind() == io::ErrorKind::ConnectionReset {
                    return Self::Reset;
                }
            }
            cause = inner.source();
        }

        Self::Other
    }
}

/// Configuration for the probe engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Deadline for each probe
    pub timeout: Duration,
    /// URL fetched through each candidate proxy
    pub probe_url: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            probe_url: DEFAULT_PROBE_URL.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_probe_url(mut self, url: String) -> Self {
        self.probe_url = url;
        self
    }
}

/// Engine that fans out one probe per endpoint and aggregates the outcomes
pub struct ProbeEngine {
    config: EngineConfig,
}

impl ProbeEngine {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Probe every endpoint concurrently and return the final tally
    ///
    /// All probes launch together with no concurrency cap and are joined
    /// at a single point; one endpoint's failure never affects another.
    /// Each probe prints its classification line as soon as it resolves,
    /// so line order follows network latency, not list order.
    pub async fn probe_all(
        &self,
        endpoints: &[Endpoint],
        progress: &dyn ProgressSink,
    ) -> RunSummary {
        let total = endpoints.len();
        let label_width = endpoints
            .iter()
            .map(|endpoint| endpoint.label().len())
            .max()
            .unwrap_or(0)
            + 1;

        let tally = RunTally::new();

        let probes = endpoints.iter().map(|endpoint| {
            let tally = &tally;
            async move {
                console::info(&format!(
                    "Trying to connect with {}...",
                    console::endpoint_label(endpoint)
                ));

                let report = self.probe_one(endpoint).await;
                emit_report(&report, label_width);

                tally.record(&report.outcome);
                progress.probe_completed(tally.completed(), total);
            }
        });

        future::join_all(probes).await;

        tally.summary()
    }

    /// Run a single probe and classify its outcome
    async fn probe_one(&self, endpoint: &Endpoint) -> ProbeReport {
        let started = Instant::now();

        let outcome = match self.fetch(endpoint).await {
            Ok((status, body)) => classify_response(status, &body),
            Err(failure) => classify_failure(failure),
        };

        ProbeReport {
            endpoint: endpoint.clone(),
            outcome,
            latency: started.elapsed(),
        }
    }

    /// Issue the GET through the endpoint and read the full body
    ///
    /// The exchange is bounded twice at the same deadline: the client
    /// carries a request timeout, and the whole send-and-read sequence sits
    /// under `tokio::time::timeout` so a stalled body read cannot outlive
    /// the probe's own deadline.
    async fn fetch(&self, endpoint: &Endpoint) -> std::result::Result<(StatusCode, String), TransportFailure> {
        let client = self
            .build_client(endpoint)
            .map_err(|_| TransportFailure::Other)?;

        let request = async {
            let response = client.get(&self.config.probe_url).send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        match tokio::time::timeout(self.config.timeout, request).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(err)) => Err(TransportFailure::from_reqwest(&err)),
            Err(_) => Err(TransportFailure::TimedOut),
        }
    }

    /// Create a client routed through the endpoint as a forward proxy
    fn build_client(&self, endpoint: &Endpoint) -> Result<Client> {
        let proxy = Proxy::http(endpoint.proxy_url())?;

        let client = Client::builder()
            .proxy(proxy)
            .timeout(self.config.timeout)
            .build()?;

        Ok(client)
    }
}

impl Default for ProbeEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify a terminal HTTP response
pub fn classify_response(status: StatusCode, body: &str) -> ProbeOutcome {
    match status.as_u16() {
        200 => match serde_json::from_str(body) {
            Ok(info) => ProbeOutcome::Up { info },
            Err(_) => ProbeOutcome::MalformedResponse,
        },
        403 => ProbeOutcome::Unauthorized,
        code => ProbeOutcome::OtherHttpError { status: code },
    }
}

/// Classify a transport-level failure
pub fn classify_failure(failure: TransportFailure) -> ProbeOutcome {
    match failure {
        TransportFailure::Reset => ProbeOutcome::ConnectionReset,
        TransportFailure::TimedOut => ProbeOutcome::TimedOut,
        TransportFailure::Other => ProbeOutcome::MalformedResponse,
    }
}

/// Print one classification line with the label padded to the column width
fn emit_report(report: &ProbeReport, label_width: usize) {
    let padding = " ".repeat(label_width.saturating_sub(report.endpoint.label().len()));
    let label = format!("{}{}", console::endpoint_label(&report.endpoint), padding);
    let time = format_duration(report.latency.as_millis() as u64).text;

    match &report.outcome {
        ProbeOutcome::Up { info } => console::check(&format!(
            "{} is up and ready to be used. [ Time: {} ] - {} / {}",
            label, time, info.country, info.autonomous_system
        )),
        ProbeOutcome::Unauthorized => console::cross(&format!(
            "{} revoked your connection. Not authorized. [ Time: {} ]",
            label, time
        )),
        ProbeOutcome::OtherHttpError { status } => console::cross(&format!(
            "{} responded with Error {}. [ Time: {} ]",
            label, status, time
        )),
        ProbeOutcome::ConnectionReset => console::cross(&format!(
            "{} has reset the connection with you. [ Time: {} ]",
            label, time
        )),
        ProbeOutcome::TimedOut => console::warn(&format!(
            "{} may be busy or down, timed out. [ Time: {} ]",
            label, time
        )),
        ProbeOutcome::MalformedResponse => console::cross(&format!(
            "{} responded with incorrect data. [ Time: {} ]",
            label, time
        )),
    }
}
