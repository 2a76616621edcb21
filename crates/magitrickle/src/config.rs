//! Resolution of effective settings: CLI flags over `magitrickle-config`
//! layers (environment, file, defaults).

use std::path::PathBuf;

use clap::ValueEnum;

use magitrickle_config::{ConfigError, Settings};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Everything a command handler needs besides the client.
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: Settings,
    pub output: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

/// Config file in effect: `--config` / `MAGITRICKLE_CONFIG`, else the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(magitrickle_config::config_path)
}

/// Load layered settings and apply CLI flag overrides.
pub fn resolve(global: &GlobalOpts) -> Result<Context, CliError> {
    let mut settings = magitrickle_config::load_settings_from(&config_path(global))?;

    if let Some(ref socket) = global.socket {
        settings.socket_path.clone_from(socket);
    }
    if let Some(timeout) = global.timeout {
        settings.timeout_secs = timeout;
    }

    let output = match global.output {
        Some(format) => format,
        None => parse_value::<OutputFormat>("output", &settings.output)?,
    };
    let color_mode = match global.color_mode {
        Some(mode) => mode,
        None => parse_value::<ColorMode>("color", &settings.color)?,
    };

    Ok(Context {
        settings,
        output,
        color: output::should_color(color_mode),
        quiet: global.quiet,
    })
}

fn parse_value<T: ValueEnum>(field: &'static str, value: &str) -> Result<T, CliError> {
    T::from_str(value, true).map_err(|reason| {
        CliError::Config(ConfigError::Validation {
            field,
            reason: format!("'{value}': {reason}"),
        })
    })
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use std::time::Duration;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["magitrickle"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["system", "interfaces"]);
        Cli::try_parse_from(argv).expect("parse").global
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "socket_path = \"/from/file.sock\"\ntimeout_secs = 4\noutput = \"yaml\"\n")
            .expect("write");
        let path_arg = path.display().to_string();

        let ctx = resolve(&global(&["--config", &path_arg])).expect("resolve");
        assert_eq!(ctx.settings.socket_path, PathBuf::from("/from/file.sock"));
        assert_eq!(ctx.settings.timeout(), Duration::from_secs(4));
        assert_eq!(ctx.output, OutputFormat::Yaml);

        let ctx = resolve(&global(&[
            "--config",
            &path_arg,
            "--socket",
            "/from/flag.sock",
            "--timeout",
            "2",
            "-o",
            "plain",
            "--color-mode",
            "never",
        ]))
        .expect("resolve");
        assert_eq!(ctx.settings.socket_path, PathBuf::from("/from/flag.sock"));
        assert_eq!(ctx.settings.timeout_secs, 2);
        assert_eq!(ctx.output, OutputFormat::Plain);
        assert!(!ctx.color);
    }
}
