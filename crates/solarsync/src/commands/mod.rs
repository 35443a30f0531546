//! Command dispatch: bridges CLI args -> config -> core run controller.

pub mod config_cmd;
pub mod plants;
pub mod run;

use solarsync_config::{Config, config_path, load_config};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Load configuration for a command that needs credential sets.
///
/// With no `--config` and nothing at the default path, a config that
/// also has no env-supplied credentials is reported as missing rather
/// than empty.
pub(crate) fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let config = load_config(global.config.as_deref())?;
    if global.config.is_none() && config.credentials.is_empty() {
        let path = config_path();
        if !path.exists() {
            return Err(CliError::NoConfig {
                path: path.display().to_string(),
            });
        }
    }
    Ok(config)
}
