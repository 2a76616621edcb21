// HTTP/1.1 over the daemon's Unix domain socket.
//
// One connection per call: connect, handshake, send, collect the body,
// drop. The whole exchange runs under a single deadline.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{ACCEPT, CONTENT_TYPE, HOST};
use hyper::{HeaderMap, Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::UnixStream;
use tracing::{debug, trace};

use crate::error::TransportError;

/// Socket the daemon listens on.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/magitrickle.sock";

/// Deadline for one complete request/response exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const JSON: &str = "application/json";

/// Where and how long to talk to the daemon.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub socket_path: PathBuf,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    pub fn with_socket_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.socket_path = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Status, headers and body of a daemon response.
///
/// A body that failed to arrive is kept as `Err(reason)` so the caller can
/// still report the status code.
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    body: Result<Bytes, String>,
}

impl RawResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Result<Bytes, String>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn body(&self) -> Result<&[u8], &str> {
        match &self.body {
            Ok(bytes) => Ok(bytes.as_ref()),
            Err(reason) => Err(reason.as_str()),
        }
    }
}

/// Single-shot HTTP transport over a Unix socket.
#[derive(Debug, Clone)]
pub struct UnixTransport {
    config: TransportConfig,
}

impl UnixTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    pub fn socket_path(&self) -> &Path {
        &self.config.socket_path
    }

    /// Perform one request. `body`, when present, is sent as JSON.
    pub async fn send(
        &self,
        method: Method,
        target: &str,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse, TransportError> {
        let started = Instant::now();
        let result = tokio::time::timeout(
            self.config.timeout,
            self.exchange(method.clone(), target, body),
        )
        .await;

        let response = result.map_err(|_| TransportError::Timeout {
            path: self.config.socket_path.clone(),
            timeout: self.config.timeout,
        })??;

        debug!(
            %method,
            uri = target,
            status = response.status.as_u16(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "daemon request"
        );
        Ok(response)
    }

    async fn exchange(
        &self,
        method: Method,
        target: &str,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse, TransportError> {
        let path = &self.config.socket_path;

        let stream = UnixStream::connect(path).await.map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                TransportError::NotRunning { path: path.clone() }
            } else {
                TransportError::Connect {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        let (mut sender, conn) =
            hyper::client::conn::http1::handshake::<_, Full<Bytes>>(TokioIo::new(stream))
                .await
                .map_err(|e| self.protocol(format!("handshake failed: {e}")))?;

        // Drive the connection until the sender is dropped.
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                trace!(error = %e, "daemon connection closed with error");
            }
        });

        let mut builder = Request::builder()
            .method(method)
            .uri(target)
            .header(HOST, "unix")
            .header(ACCEPT, JSON);
        if body.is_some() {
            builder = builder.header(CONTENT_TYPE, JSON);
        }
        let request = builder
            .body(Full::new(body.map(Bytes::from).unwrap_or_default()))
            .map_err(|e| self.protocol(format!("invalid request: {e}")))?;

        let response = sender
            .send_request(request)
            .await
            .map_err(|e| self.protocol(format!("request failed: {e}")))?;

        let (parts, incoming) = response.into_parts();
        let body = incoming
            .collect()
            .await
            .map(http_body_util::Collected::to_bytes)
            .map_err(|e| e.to_string());

        Ok(RawResponse::new(parts.status, parts.headers, body))
    }

    fn protocol(&self, reason: String) -> TransportError {
        TransportError::Protocol {
            path: self.config.socket_path.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_daemon_socket() {
        let config = TransportConfig::default();
        assert_eq!(config.socket_path, Path::new("/var/run/magitrickle.sock"));
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn missing_socket_is_not_running() {
        let dir = tempfile::tempdir().expect("tempdir");
        let transport = UnixTransport::new(
            TransportConfig::default().with_socket_path(dir.path().join("absent.sock")),
        );

        let result = transport.send(Method::GET, "/api/v1/groups", None).await;
        assert!(
            matches!(result, Err(TransportError::NotRunning { .. })),
            "expected NotRunning, got: {result:?}"
        );
    }

    #[tokio::test]
    async fn silent_listener_times_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let socket = dir.path().join("silent.sock");
        // Accepts connections but never answers.
        let _listener = tokio::net::UnixListener::bind(&socket).expect("bind");

        let transport = UnixTransport::new(
            TransportConfig::default()
                .with_socket_path(&socket)
                .with_timeout(Duration::from_millis(200)),
        );

        let started = Instant::now();
        let result = transport.send(Method::GET, "/api/v1/groups", None).await;
        assert!(
            matches!(result, Err(TransportError::Timeout { .. })),
            "expected Timeout, got: {result:?}"
        );
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn body_failure_is_preserved() {
        let raw = RawResponse::new(
            StatusCode::BAD_GATEWAY,
            HeaderMap::new(),
            Err("connection reset".into()),
        );
        assert_eq!(raw.body(), Err("connection reset"));
    }
}
