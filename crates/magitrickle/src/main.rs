mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use magitrickle_api::DaemonClient;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse CLI arguments (clap exits with code 2 on usage errors)
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "magitrickle", &mut std::io::stdout());
            Ok(())
        }

        // Config commands don't need a daemon connection
        Command::Config(ref args) => {
            let ctx = config::resolve(&cli.global)?;
            commands::config_cmd::handle(args, &cli.global, &ctx)
        }

        // Everything else is one request to the daemon
        cmd => {
            let ctx = config::resolve(&cli.global)?;
            let client = DaemonClient::new(ctx.settings.transport());

            tracing::debug!(
                command = ?cmd,
                socket = %ctx.settings.socket_path.display(),
                "dispatching command"
            );
            commands::dispatch(cmd, &client, &ctx).await
        }
    }
}
