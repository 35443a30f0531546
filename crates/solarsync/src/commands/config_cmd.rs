//! Config subcommand handlers.

use solarsync_config::{config_path, load_config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let config = load_config(global.config.as_deref())?;
            output::print_output(config.to_redacted_toml()?.trim_end());
            Ok(())
        }
        ConfigCommand::Path => {
            let path = global.config.clone().unwrap_or_else(config_path);
            output::print_output(&path.display().to_string());
            Ok(())
        }
    }
}
