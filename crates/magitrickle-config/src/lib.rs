//! Client-side settings for the MagiTrickle CLI.
//!
//! Layers built-in defaults, an optional TOML file and `MAGITRICKLE_*`
//! environment variables, then hands out a `TransportConfig` for the API
//! client. Command-line flags are applied on top by the binary.
//!
//! This never touches the daemon's own configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use magitrickle_api::{DEFAULT_SOCKET_PATH, DEFAULT_TIMEOUT, TransportConfig};

/// Environment prefix for every setting (`MAGITRICKLE_SOCKET_PATH`, ...).
pub const ENV_PREFIX: &str = "MAGITRICKLE_";

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "MAGITRICKLE_CONFIG";

const KEYS: &[&str] = &["socket_path", "timeout_secs", "output", "color"];
const OUTPUTS: &[&str] = &["table", "json", "json-compact", "yaml", "plain"];
const COLORS: &[&str] = &["auto", "always", "never"];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("failed to serialize settings: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings ────────────────────────────────────────────────────────

/// Resolved client settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// Unix socket the daemon listens on.
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,

    /// Deadline for one request/response exchange, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Default output format name.
    #[serde(default = "default_output")]
    pub output: String,

    /// Default color mode name.
    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            timeout_secs: default_timeout_secs(),
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_socket_path() -> PathBuf {
    PathBuf::from(DEFAULT_SOCKET_PATH)
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Transport parameters for `DaemonClient::new`.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig::default()
            .with_socket_path(&self.socket_path)
            .with_timeout(self.timeout())
    }

    /// Render as TOML, the same shape the config file uses.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "timeout_secs",
                reason: "must be at least 1 second".into(),
            });
        }
        if self.socket_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation {
                field: "socket_path",
                reason: "must not be empty".into(),
            });
        }
        one_of("output", &self.output, OUTPUTS)?;
        one_of("color", &self.color, COLORS)?;
        Ok(self)
    }
}

fn one_of(field: &'static str, value: &str, allowed: &[&str]) -> Result<(), ConfigError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Validation {
            field,
            reason: format!("'{value}' is not one of: {}", allowed.join(", ")),
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `MAGITRICKLE_CONFIG`, else XDG / platform
/// conventions.
pub fn config_path() -> PathBuf {
    if let Some(explicit) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(explicit);
    }
    ProjectDirs::from("", "", "magitrickle").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("magitrickle");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load settings from `path` (missing file is fine) plus environment.
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    debug!(path = %path.display(), "loading settings");
    let figment = base(path).merge(Env::prefixed(ENV_PREFIX).only(KEYS));
    extract(&figment)
}

fn base(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Toml::file(path))
}

fn extract(figment: &Figment) -> Result<Settings, ConfigError> {
    figment.extract::<Settings>()?.validate()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    fn from_file(contents: &str) -> Result<Settings, ConfigError> {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).expect("write config");
        extract(&base(&path))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = extract(&base(&dir.path().join("absent.toml"))).expect("defaults");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.socket_path, PathBuf::from("/var/run/magitrickle.sock"));
        assert_eq!(settings.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn file_overrides_defaults() {
        let settings = from_file(
            r#"
            socket_path = "/tmp/mt.sock"
            timeout_secs = 3
            output = "json"
            "#,
        )
        .expect("valid config");

        assert_eq!(settings.socket_path, PathBuf::from("/tmp/mt.sock"));
        assert_eq!(settings.timeout_secs, 3);
        assert_eq!(settings.output, "json");
        assert_eq!(settings.color, "auto");

        let transport = settings.transport();
        assert_eq!(transport.socket_path, PathBuf::from("/tmp/mt.sock"));
        assert_eq!(transport.timeout, Duration::from_secs(3));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = from_file("timeout_secs = 0").expect_err("zero timeout");
        assert!(matches!(err, ConfigError::Validation { field: "timeout_secs", .. }));
    }

    #[test]
    fn unknown_output_is_rejected() {
        let err = from_file(r#"output = "xml""#).expect_err("bad output");
        assert!(err.to_string().contains("'xml' is not one of"), "{err}");
    }

    #[test]
    fn malformed_file_is_a_figment_error() {
        let err = from_file("timeout_secs = \"soon\"").expect_err("type mismatch");
        assert!(matches!(err, ConfigError::Figment(_)));
    }

    #[test]
    fn toml_rendering_lists_every_key() {
        let rendered = Settings::default().to_toml().expect("serialize");
        for key in KEYS {
            assert!(rendered.contains(key), "missing {key} in:\n{rendered}");
        }
    }
}
