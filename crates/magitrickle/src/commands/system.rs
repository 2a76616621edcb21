//! System command handlers.

use tabled::Tabled;

use magitrickle_api::{DaemonClient, HookRequest, Interface};

use crate::cli::{SystemArgs, SystemCommand};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "Interface")]
    id: String,
}

impl From<&Interface> for InterfaceRow {
    fn from(i: &Interface) -> Self {
        Self { id: i.id.clone() }
    }
}

pub async fn handle(client: &DaemonClient, args: SystemArgs, ctx: &Context) -> Result<(), CliError> {
    match args.command {
        SystemCommand::Netfilterd { hook_type, table } => {
            let req = HookRequest { hook_type, table };
            client.trigger_netfilterd(&req).await?;
            output::print_status("Netfilterd hook triggered successfully", ctx.quiet);
            Ok(())
        }

        SystemCommand::Interfaces => {
            let interfaces = client.list_interfaces().await?;
            let out = output::render_list(
                ctx.output,
                &interfaces,
                "No interfaces found.",
                |i| InterfaceRow::from(i),
                |i| i.id.clone(),
            )?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }

        SystemCommand::SaveConfig => {
            client.save_config().await?;
            output::print_status("Configuration saved successfully", ctx.quiet);
            Ok(())
        }
    }
}
