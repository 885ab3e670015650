//! End-to-end probe engine tests against loopback fake proxies
//!
//! Each fake proxy is a TcpListener that reads the forwarded request and
//! answers with a canned HTTP response, so no probe ever leaves 127.0.0.1.

use proximus::probe::{Endpoint, EngineConfig, NoProgress, ProbeEngine, ProgressSink};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Spawn a fake proxy that answers every connection with the given status
/// line and body, then returns its endpoint.
async fn spawn_fake_proxy(status_line: &'static str, body: &'static str) -> Endpoint {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                if read_request_head(&mut socket).await.is_err() {
                    return;
                }
                let response = format!(
                    "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    Endpoint::new("127.0.0.1", port.to_string())
}

/// Spawn a fake proxy that accepts connections and never responds.
async fn spawn_silent_proxy() -> Endpoint {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = read_request_head(&mut socket).await;
                // hold the socket open until the probe gives up
                tokio::time::sleep(Duration::from_secs(30)).await;
            });
        }
    });

    Endpoint::new("127.0.0.1", port.to_string())
}

/// Reserve a port with nothing listening on it.
async fn unreachable_endpoint() -> Endpoint {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    Endpoint::new("127.0.0.1", port.to_string())
}

async fn read_request_head(socket: &mut tokio::net::TcpStream) -> std::io::Result<()> {
    let mut seen = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = socket.read(&mut buf).await?;
        if n == 0 {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof));
        }
        seen.extend_from_slice(&buf[..n]);
        if seen.windows(4).any(|window| window == b"\r\n\r\n") {
            return Ok(());
        }
    }
}

fn engine_with_timeout(ms: u64) -> ProbeEngine {
    ProbeEngine::with_config(EngineConfig::new().with_timeout(Duration::from_millis(ms)))
}

const GOOD_BODY: &str = r#"{"status":"success","country":"US","as":"AS123 Example","query":"1.2.3.4"}"#;

#[tokio::test]
async fn reachable_proxy_counts_as_up() {
    let endpoint = spawn_fake_proxy("HTTP/1.1 200 OK", GOOD_BODY).await;

    let summary = engine_with_timeout(2000)
        .probe_all(&[endpoint], &NoProgress)
        .await;

    assert_eq!(summary.up, 1);
    assert_eq!(summary.timed_out, 0);
    assert_eq!(summary.errored, 0);
}

#[tokio::test]
async fn unauthorized_proxy_counts_as_error() {
    let endpoint = spawn_fake_proxy("HTTP/1.1 403 Forbidden", "denied").await;

    let summary = engine_with_timeout(2000)
        .probe_all(&[endpoint], &NoProgress)
        .await;

    assert_eq!(summary.up, 0);
    assert_eq!(summary.errored, 1);
}

#[tokio::test]
async fn server_error_counts_as_error() {
    let endpoint = spawn_fake_proxy("HTTP/1.1 502 Bad Gateway", "").await;

    let summary = engine_with_timeout(2000)
        .probe_all(&[endpoint], &NoProgress)
        .await;

    assert_eq!(summary.errored, 1);
}

#[tokio::test]
async fn unparseable_body_counts_as_error() {
    let endpoint = spawn_fake_proxy("HTTP/1.1 200 OK", "<html>captive portal</html>").await;

    let summary = engine_with_timeout(2000)
        .probe_all(&[endpoint], &NoProgress)
        .await;

    assert_eq!(summary.up, 0);
    assert_eq!(summary.errored, 1);
}

#[tokio::test]
async fn silent_proxy_counts_as_timed_out() {
    let endpoint = spawn_silent_proxy().await;

    let summary = engine_with_timeout(300)
        .probe_all(&[endpoint], &NoProgress)
        .await;

    assert_eq!(summary.timed_out, 1);
    assert_eq!(summary.up, 0);
    assert_eq!(summary.errored, 0);
}

#[tokio::test]
async fn refused_connection_counts_as_error() {
    let endpoint = unreachable_endpoint().await;

    let summary = engine_with_timeout(2000)
        .probe_all(&[endpoint], &NoProgress)
        .await;

    assert_eq!(summary.errored, 1);
}

#[tokio::test]
async fn garbage_port_counts_as_error() {
    let endpoint = Endpoint::new("1.2.3.4", "not-a-port");

    let summary = engine_with_timeout(2000)
        .probe_all(&[endpoint], &NoProgress)
        .await;

    assert_eq!(summary.errored, 1);
}

#[tokio::test]
async fn tally_covers_every_endpoint_exactly_once() {
    let endpoints = vec![
        spawn_fake_proxy("HTTP/1.1 200 OK", GOOD_BODY).await,
        spawn_fake_proxy("HTTP/1.1 403 Forbidden", "").await,
        spawn_silent_proxy().await,
        unreachable_endpoint().await,
    ];

    let summary = engine_with_timeout(500)
        .probe_all(&endpoints, &NoProgress)
        .await;

    assert_eq!(summary.total(), endpoints.len());
    assert_eq!(summary.up, 1);
    assert_eq!(summary.timed_out, 1);
    assert_eq!(summary.errored, 2);
}

struct RecordingSink {
    calls: AtomicUsize,
    last_done: AtomicUsize,
}

impl ProgressSink for RecordingSink {
    fn probe_completed(&self, done: usize, _total: usize) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_done.fetch_max(done, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn progress_sink_observes_every_completion() {
    let endpoints = vec![
        spawn_fake_proxy("HTTP/1.1 200 OK", GOOD_BODY).await,
        spawn_fake_proxy("HTTP/1.1 403 Forbidden", "").await,
        unreachable_endpoint().await,
    ];

    let sink = RecordingSink {
        calls: AtomicUsize::new(0),
        last_done: AtomicUsize::new(0),
    };

    let summary = engine_with_timeout(2000)
        .probe_all(&endpoints, &sink)
        .await;

    assert_eq!(sink.calls.load(Ordering::SeqCst), endpoints.len());
    assert_eq!(sink.last_done.load(Ordering::SeqCst), endpoints.len());
    assert_eq!(summary.total(), endpoints.len());
}
