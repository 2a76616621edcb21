//! CLI error types with miette diagnostics.
//!
//! Maps `magitrickle_api::Error` and `ConfigError` into user-facing errors
//! with actionable help text. The primary message of daemon-reported errors
//! is the translator's text, unchanged.

use miette::Diagnostic;
use thiserror::Error;

use magitrickle_api::{Error as ApiError, StatusCode, TransportError};
use magitrickle_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("MagiTrickle daemon is not running")]
    #[diagnostic(
        code(magitrickle::connection_failed),
        help(
            "No socket at {path}.\n\
             Start the daemon, or point --socket / MAGITRICKLE_SOCKET at its socket."
        )
    )]
    DaemonNotRunning { path: String },

    #[error("Could not talk to the daemon at {path}")]
    #[diagnostic(
        code(magitrickle::connection_failed),
        help("Check that the daemon is running and that you may access its socket.")
    )]
    ConnectionFailed {
        path: String,
        #[source]
        source: TransportError,
    },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(magitrickle::timeout),
        help("Increase the deadline with --timeout or check daemon responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Daemon-reported ──────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(magitrickle::api_error))]
    Api {
        status: u16,
        message: String,
        #[help]
        hint: Option<String>,
    },

    #[error("{message}")]
    #[diagnostic(code(magitrickle::status))]
    Status {
        status: u16,
        message: String,
        #[help]
        hint: Option<String>,
    },

    #[error("Unexpected response from the daemon: {message}")]
    #[diagnostic(
        code(magitrickle::decode),
        help("The daemon and this client may be different versions.")
    )]
    Decode {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(magitrickle::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(magitrickle::config),
        help("Check the config file (see `magitrickle config path`) and MAGITRICKLE_* variables.")
    )]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(magitrickle::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Could not render YAML output: {0}")]
    #[diagnostic(code(magitrickle::render))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DaemonNotRunning { .. } | Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Api { status, .. } | Self::Status { status, .. } => status_exit_code(*status),
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

fn status_exit_code(status: u16) -> i32 {
    match status {
        404 => exit_code::NOT_FOUND,
        409 => exit_code::CONFLICT,
        _ => exit_code::GENERAL,
    }
}

fn status_hint(status: StatusCode) -> Option<String> {
    match status {
        StatusCode::NOT_FOUND => {
            Some("Run: magitrickle group list (or rule list <GROUP_ID>) to see valid IDs".into())
        }
        StatusCode::BAD_REQUEST => Some("The daemon rejected the request fields.".into()),
        s if s.is_server_error() => Some("Check the daemon log for details.".into()),
        _ => None,
    }
}

// ── ApiError → CliError mapping ──────────────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        let message = err.to_string();
        match err {
            ApiError::Transport(TransportError::NotRunning { path }) => CliError::DaemonNotRunning {
                path: path.display().to_string(),
            },

            ApiError::Transport(TransportError::Timeout { timeout, .. }) => CliError::Timeout {
                seconds: timeout.as_secs(),
            },

            ApiError::Transport(source) => {
                let path = match &source {
                    TransportError::NotRunning { path }
                    | TransportError::Connect { path, .. }
                    | TransportError::Timeout { path, .. }
                    | TransportError::Protocol { path, .. }
                    | TransportError::Body { path, .. } => path.display().to_string(),
                };
                CliError::ConnectionFailed { path, source }
            }

            ApiError::Api { status, .. } => CliError::Api {
                status: status.as_u16(),
                hint: status_hint(status),
                message,
            },

            ApiError::Status { status, .. } => CliError::Status {
                status: status.as_u16(),
                hint: status_hint(status),
                message,
            },

            ApiError::Deserialization {
                what,
                body_preview,
                source,
            } => CliError::Decode {
                message: format!("could not decode {what} (body: {body_preview:?})"),
                source,
            },

            ApiError::Serialization(source) => CliError::Json(source),

            ApiError::InvalidIdentifier { kind, value, reason } => CliError::Validation {
                field: format!("{kind} ID"),
                reason: format!("{value:?} {reason}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use magitrickle_api::translate_error;

    use super::*;

    #[test]
    fn daemon_message_is_kept_verbatim() {
        let api = translate_error(StatusCode::NOT_FOUND, Ok(br#"{"error":"group not found"}"#));
        let err = CliError::from(api);
        assert_eq!(err.to_string(), "api error 404: group not found");
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
    }

    #[test]
    fn conflict_maps_to_conflict_exit() {
        let err = CliError::from(translate_error(StatusCode::CONFLICT, Ok(b"")));
        assert_eq!(err.to_string(), "request failed with status code 409");
        assert_eq!(err.exit_code(), exit_code::CONFLICT);
    }

    #[test]
    fn server_error_is_general_failure() {
        let err = CliError::from(translate_error(StatusCode::INTERNAL_SERVER_ERROR, Ok(b"oops")));
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn transport_failures_map_to_connection_and_timeout() {
        let not_running = CliError::from(ApiError::Transport(TransportError::NotRunning {
            path: PathBuf::from("/var/run/magitrickle.sock"),
        }));
        assert_eq!(not_running.exit_code(), exit_code::CONNECTION);

        let timeout = CliError::from(ApiError::Transport(TransportError::Timeout {
            path: PathBuf::from("/var/run/magitrickle.sock"),
            timeout: Duration::from_secs(10),
        }));
        assert_eq!(timeout.to_string(), "Request timed out after 10s");
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);
    }

    #[test]
    fn yaml_failure_is_general_failure() {
        let yaml = serde_yaml::from_str::<u8>("[").expect_err("not a number");
        let err = CliError::from(yaml);
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn invalid_identifier_is_usage_error() {
        let err = CliError::from(ApiError::InvalidIdentifier {
            kind: "group",
            value: "a/b".into(),
            reason: "must not contain '/', '?' or '#'",
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
