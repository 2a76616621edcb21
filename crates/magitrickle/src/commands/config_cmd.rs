//! Config subcommand handlers. None of these talk to the daemon.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Context};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts, ctx: &Context) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let out = match ctx.output {
                OutputFormat::Table | OutputFormat::Plain => ctx.settings.to_toml()?,
                structured => output::render_structured(structured, &ctx.settings)?,
            };
            output::print_output(out.trim_end(), ctx.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            let path = config::config_path(global);
            let note = if path.exists() { "" } else { " (not found)" };
            output::print_output(&format!("{}{note}", path.display()), ctx.quiet);
            Ok(())
        }
    }
}
