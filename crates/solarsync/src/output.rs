//! Output formatting: tables via `tabled`, JSON via serde.
//!
//! Tables go to stdout; logs go to stderr, so `solarsync run -o json`
//! stays machine-readable.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use solarsync_core::{Device, Hierarchy, Plant, RunState, SetOutcome};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Render rows as a table or a JSON array.
pub fn render_list<R>(format: OutputFormat, rows: &[R]) -> Result<String, CliError>
where
    R: Tabled + Serialize,
{
    match format {
        OutputFormat::Table => Ok(Table::new(rows).with(Style::rounded()).to_string()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
    }
}

pub fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Run summary ──────────────────────────────────────────────────────

#[derive(Debug, Serialize, Tabled)]
pub struct SetRow {
    #[tabled(rename = "Host")]
    pub host: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Plants")]
    pub plants: usize,
    #[tabled(rename = "Devices")]
    pub devices: usize,
    #[tabled(rename = "Loggers")]
    pub loggers: usize,
    #[tabled(rename = "Posted")]
    pub posted: usize,
    #[tabled(rename = "Skipped")]
    pub skipped: usize,
    #[tabled(rename = "Failed")]
    pub failed: usize,
    #[tabled(rename = "Unmapped")]
    pub unmapped: usize,
    #[tabled(rename = "Error")]
    pub error: String,
}

impl SetRow {
    pub fn from_outcome(outcome: &SetOutcome, color: bool) -> Self {
        let status = match (outcome.state, outcome.failed_at) {
            (RunState::Failed, Some(at)) => format!("failed ({at:?})"),
            (state, _) => format!("{state:?}"),
        };
        let status = match (color, outcome.is_success()) {
            (false, _) => status,
            (true, true) => status.green().to_string(),
            (true, false) => status.red().to_string(),
        };

        match &outcome.result {
            Ok(summary) => Self {
                host: outcome.host.clone(),
                status,
                plants: summary.plants,
                devices: summary.devices,
                loggers: summary.aggregated,
                posted: summary.reports.posted,
                skipped: summary.reports.skipped,
                failed: summary.reports.failed,
                unmapped: summary.unmapped_device_ids,
                error: String::new(),
            },
            Err(e) => Self {
                host: outcome.host.clone(),
                status,
                plants: 0,
                devices: 0,
                loggers: 0,
                posted: 0,
                skipped: 0,
                failed: 0,
                unmapped: 0,
                error: e.to_string(),
            },
        }
    }
}

// ── Hierarchy listing ────────────────────────────────────────────────

#[derive(Debug, Serialize, Tabled)]
pub struct DeviceRow {
    #[tabled(rename = "Host")]
    pub host: String,
    #[tabled(rename = "Plant ID")]
    pub plant_id: String,
    #[tabled(rename = "Plant")]
    pub plant_name: String,
    #[tabled(rename = "Logger")]
    pub logger_name: String,
    #[tabled(rename = "Device ID")]
    pub device_id: String,
    #[tabled(rename = "Device")]
    pub device_name: String,
}

/// One row per device; plants without devices get a single row with
/// empty device columns.
pub fn hierarchy_rows(host: &str, hierarchy: &Hierarchy) -> Vec<DeviceRow> {
    let mut rows = Vec::new();
    for plant in &hierarchy.plants {
        let devices: Vec<&Device> = hierarchy
            .devices
            .iter()
            .filter(|d| d.plant_id == plant.id)
            .collect();
        if devices.is_empty() {
            rows.push(plant_row(host, plant, None));
        } else {
            rows.extend(devices.into_iter().map(|d| plant_row(host, plant, Some(d))));
        }
    }
    rows
}

fn plant_row(host: &str, plant: &Plant, device: Option<&Device>) -> DeviceRow {
    DeviceRow {
        host: host.to_owned(),
        plant_id: plant.id.clone(),
        plant_name: plant.name.clone(),
        logger_name: device.map(|d| d.logger_name.clone()).unwrap_or_default(),
        device_id: device.map(|d| d.id.clone()).unwrap_or_default(),
        device_name: device.map(|d| d.name.clone()).unwrap_or_default(),
    }
}
