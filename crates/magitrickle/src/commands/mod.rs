//! Command dispatch.

pub mod config_cmd;
pub mod groups;
pub mod rules;
pub mod system;
pub mod util;

use magitrickle_api::DaemonClient;

use crate::cli::Command;
use crate::config::Context;
use crate::error::CliError;

/// Route a daemon-facing command to its handler.
pub async fn dispatch(cmd: Command, client: &DaemonClient, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::Group(args) => groups::handle(client, args, ctx).await,
        Command::Rule(args) => rules::handle(client, args, ctx).await,
        Command::System(args) => system::handle(client, args, ctx).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
