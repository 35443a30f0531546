//! `solarsync plants`: list the plant/device hierarchy per credential set.

use tracing::error;

use solarsync_config::select_hosts;
use solarsync_core::RunController;

use crate::cli::{GlobalOpts, PlantsArgs};
use crate::error::CliError;
use crate::output::{self, DeviceRow};

pub async fn handle(args: PlantsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = super::load(global)?;
    let sets = select_hosts(config.credential_sets()?, &args.hosts)?;
    let controller = RunController::new(config.run_settings(true)?)?;

    let mut rows: Vec<DeviceRow> = Vec::new();
    let mut failures: Vec<CliError> = Vec::new();
    for set in &sets {
        match controller.discover(set).await {
            Ok(hierarchy) => rows.extend(output::hierarchy_rows(&set.host, &hierarchy)),
            Err(e) => {
                error!(host = %set.host, error = %e, "enumeration failed");
                failures.push(e.into());
            }
        }
    }

    output::print_output(&output::render_list(global.output, &rows)?);

    // A single failing set keeps its specific error (and exit code).
    match failures.len() {
        0 => Ok(()),
        1 if sets.len() == 1 => Err(failures.remove(0)),
        failed => Err(CliError::SetsFailed {
            failed,
            total: sets.len(),
        }),
    }
}
