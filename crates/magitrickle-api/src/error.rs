use std::path::PathBuf;
use std::time::Duration;

use hyper::StatusCode;
use thiserror::Error;

use crate::types::ErrorResponse;

/// Top-level error type for the `magitrickle-api` crate.
///
/// Keeps three families apart: failures talking to the socket
/// ([`Error::Transport`]), failures reported by the daemon itself
/// ([`Error::Api`] / [`Error::Status`]), and local failures to encode a
/// request or decode a successful response.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// The socket exchange itself failed (connect, timeout, framing).
    #[error(transparent)]
    Transport(#[from] TransportError),

    // ── Daemon-reported ─────────────────────────────────────────────
    /// Non-success status with a decodable `{"error": "..."}` body.
    #[error("api error {}: {message}", status.as_u16())]
    Api { status: StatusCode, message: String },

    /// Non-success status without a usable error message.
    #[error("request failed with status code {}{}", status.as_u16(), body_error_suffix(body_error.as_deref()))]
    Status {
        status: StatusCode,
        body_error: Option<String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// A success response whose body did not match the expected schema.
    #[error("failed to decode {what}: {source} (body preview: {body_preview:?})")]
    Deserialization {
        what: &'static str,
        body_preview: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Serialization(#[source] serde_json::Error),

    // ── Local usage ─────────────────────────────────────────────────
    /// An identifier that cannot be embedded in a request path.
    #[error("invalid {kind} ID {value:?}: {reason}")]
    InvalidIdentifier {
        kind: &'static str,
        value: String,
        reason: &'static str,
    },
}

fn body_error_suffix(body_error: Option<&str>) -> String {
    body_error.map_or_else(String::new, |e| format!(" (and body read error: {e})"))
}

/// Failure modes of a single request/response exchange on the socket.
///
/// Always fatal to the invocation; the client never retries.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The socket path does not exist, so the daemon is not listening.
    #[error("daemon is not running (socket not found at {})", path.display())]
    NotRunning { path: PathBuf },

    /// The socket exists but the connection was refused or dropped.
    #[error("failed to connect to daemon socket at {}: {source}", path.display())]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The exchange did not finish within the deadline.
    #[error("request to {} timed out after {}s", path.display(), timeout.as_secs())]
    Timeout { path: PathBuf, timeout: Duration },

    /// HTTP handshake, request framing or response parsing failed.
    #[error("HTTP exchange over {} failed: {reason}", path.display())]
    Protocol { path: PathBuf, reason: String },

    /// The daemon answered with a success status but the body could not be read.
    #[error("failed to read response body from {}: {reason}", path.display())]
    Body { path: PathBuf, reason: String },
}

impl Error {
    /// Returns `true` if this failure happened before the daemon produced an answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns `true` if this is a timeout of the socket exchange.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Timeout { .. }))
    }

    /// Returns `true` if the daemon answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// The HTTP status reported by the daemon, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } | Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ── Error translation ───────────────────────────────────────────────

/// Turn a non-success response into an [`Error`].
///
/// Prefers the daemon's `{"error": "..."}` message; falls back to the bare
/// status code when the body is empty, is not an [`ErrorResponse`], or carries
/// an empty message. A body that could not be read degrades to the status code
/// plus the read failure, never masking the status itself.
pub fn translate_error(status: StatusCode, body: Result<&[u8], &str>) -> Error {
    let raw = match body {
        Ok(raw) => raw,
        Err(reason) => {
            return Error::Status {
                status,
                body_error: Some(reason.to_owned()),
            };
        }
    };

    match serde_json::from_slice::<ErrorResponse>(raw) {
        Ok(ErrorResponse {
            error: Some(message),
        }) if !message.is_empty() => Error::Api { status, message },
        _ => Error::Status {
            status,
            body_error: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_daemon_message() {
        let err = translate_error(StatusCode::NOT_FOUND, Ok(br#"{"error":"group not found"}"#));
        assert!(matches!(err, Error::Api { .. }));
        assert_eq!(err.to_string(), "api error 404: group not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn empty_body_keeps_status_code() {
        let err = translate_error(StatusCode::NOT_FOUND, Ok(b""));
        assert_eq!(err.to_string(), "request failed with status code 404");
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn empty_message_falls_back_to_status() {
        let err = translate_error(StatusCode::BAD_REQUEST, Ok(br#"{"error":""}"#));
        assert_eq!(err.to_string(), "request failed with status code 400");
    }

    #[test]
    fn non_json_body_falls_back_to_status() {
        let err = translate_error(StatusCode::INTERNAL_SERVER_ERROR, Ok(b"<html>oops</html>"));
        assert_eq!(err.to_string(), "request failed with status code 500");
    }

    #[test]
    fn body_read_failure_degrades_to_status() {
        let err = translate_error(StatusCode::BAD_GATEWAY, Err("connection reset"));
        assert_eq!(
            err.to_string(),
            "request failed with status code 502 (and body read error: connection reset)"
        );
        assert!(!err.is_transport());
    }

    #[test]
    fn timeout_is_a_transport_error() {
        let err = Error::from(TransportError::Timeout {
            path: PathBuf::from("/var/run/magitrickle.sock"),
            timeout: Duration::from_secs(10),
        });
        assert!(err.is_transport());
        assert!(err.is_timeout());
        assert_eq!(err.status(), None);
        assert_eq!(
            err.to_string(),
            "request to /var/run/magitrickle.sock timed out after 10s"
        );
    }
}
