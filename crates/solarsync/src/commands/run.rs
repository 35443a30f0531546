//! `solarsync run`: one full collection pass.

use tracing::info;

use solarsync_config::select_hosts;
use solarsync_core::RunController;

use crate::cli::{GlobalOpts, RunArgs};
use crate::error::CliError;
use crate::output::{self, SetRow};

/// Exit status does not depend on per-set outcomes; only configuration
/// problems surface as errors.
pub async fn handle(args: RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = super::load(global)?;
    let sets = select_hosts(config.credential_sets()?, &args.hosts)?;
    let settings = config.run_settings(args.dry_run)?;

    if args.dry_run {
        info!("dry run: nothing will be posted");
    }

    let controller = RunController::new(settings)?;
    let report = controller.run(&sets).await;

    let color = output::should_color(global.color);
    let rows: Vec<SetRow> = report
        .outcomes
        .iter()
        .map(|outcome| SetRow::from_outcome(outcome, color))
        .collect();
    output::print_output(&output::render_list(global.output, &rows)?);
    Ok(())
}
