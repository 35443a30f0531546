// ── Ingestion reporter ──
//
// Pushes plants, devices, and aggregated logger totals to the central
// ingestion API. Every POST stands alone: failures are logged and
// counted, never returned. With no ingest target configured the
// reporter only logs what it would send.

use std::ops::AddAssign;

use tracing::{debug, error, info};

use solarsync_api::{DeviceRegistration, IngestClient, LoggerPowerGen, PlantRegistration};

use crate::aggregate::round3;
use crate::config::{HttpSettings, ReportSettings};
use crate::enumerate::Hierarchy;
use crate::error::CoreError;
use crate::model::{AggregatedLoggerReading, Plant};

/// Outcome counts for one batch of POSTs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub posted: usize,
    /// Not sent: dry run, or value over the digit ceiling.
    pub skipped: usize,
    pub failed: usize,
}

impl AddAssign for ReportSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.posted += rhs.posted;
        self.skipped += rhs.skipped;
        self.failed += rhs.failed;
    }
}

pub struct Reporter {
    client: Option<IngestClient>,
    settings: ReportSettings,
}

impl Reporter {
    /// Build the ingestion client from `settings.ingest`, if any.
    pub fn new(settings: ReportSettings, http: &HttpSettings) -> Result<Self, CoreError> {
        let client = match &settings.ingest {
            Some(target) => Some(IngestClient::new(
                target.base_url.clone(),
                target.api_token.clone(),
                &http.transport(),
            )?),
            None => None,
        };
        Ok(Self { client, settings })
    }

    /// Use a pre-built client (`None` for dry run).
    pub fn with_client(client: Option<IngestClient>, settings: ReportSettings) -> Self {
        Self { client, settings }
    }

    pub fn is_dry_run(&self) -> bool {
        self.client.is_none()
    }

    /// Register every plant, when plant registration is enabled.
    pub async fn report_plants(&self, plants: &[Plant]) -> ReportSummary {
        let mut summary = ReportSummary::default();
        if !self.settings.register_plants {
            return summary;
        }

        for plant in plants {
            let body = PlantRegistration {
                plant_id: &plant.id,
                plant_name: &plant.name,
            };
            let Some(client) = &self.client else {
                info!(plant_id = %plant.id, plant_name = %plant.name, "dry run: would register plant");
                summary.skipped += 1;
                continue;
            };
            match client.post_plant(&body).await {
                Ok(()) => summary.posted += 1,
                Err(e) => {
                    error!(plant_id = %plant.id, error = %e, "plant registration failed");
                    summary.failed += 1;
                }
            }
        }
        summary
    }

    /// Register every device, when device registration is enabled.
    pub async fn report_devices(&self, hierarchy: &Hierarchy) -> ReportSummary {
        let mut summary = ReportSummary::default();
        if !self.settings.register_devices {
            return summary;
        }

        for device in &hierarchy.devices {
            let plant_name = hierarchy
                .plant(&device.plant_id)
                .map_or(device.plant_id.as_str(), |p| p.name.as_str());
            let body = DeviceRegistration {
                plant_id: &device.plant_id,
                plant_name,
                logger_name: &device.logger_name,
                device_id: &device.id,
                device_name: &device.name,
            };
            let Some(client) = &self.client else {
                info!(device_id = %device.id, logger = %device.logger_name, "dry run: would register device");
                summary.skipped += 1;
                continue;
            };
            match client.post_device(&body).await {
                Ok(()) => summary.posted += 1,
                Err(e) => {
                    error!(device_id = %device.id, error = %e, "device registration failed");
                    summary.failed += 1;
                }
            }
        }
        summary
    }

    /// Post each logger total. Values over the digit ceiling are skipped.
    pub async fn report_readings(&self, readings: &[AggregatedLoggerReading]) -> ReportSummary {
        let mut summary = ReportSummary::default();

        for reading in readings {
            let power_gen = round3(reading.total);
            if exceeds_digit_ceiling(power_gen, self.settings.max_integer_digits) {
                error!(
                    logger = %reading.logger_name,
                    power_gen,
                    max_digits = self.settings.max_integer_digits,
                    "generation value too large, not posting"
                );
                summary.skipped += 1;
                continue;
            }

            let body = LoggerPowerGen {
                logger_name: &reading.logger_name,
                power_gen,
            };
            let Some(client) = &self.client else {
                info!(logger = %reading.logger_name, power_gen, "dry run: would post generation");
                summary.skipped += 1;
                continue;
            };
            match client.post_logger_power_gen(&body).await {
                Ok(()) => {
                    debug!(logger = %reading.logger_name, power_gen, "generation posted");
                    summary.posted += 1;
                }
                Err(e) => {
                    error!(logger = %reading.logger_name, power_gen, error = %e, "generation post failed");
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}

/// Whether the integer part of `value` has more than `max_digits` digits.
///
/// Non-finite values always exceed it.
pub fn exceeds_digit_ceiling(value: f64, max_digits: u32) -> bool {
    if !value.is_finite() {
        return true;
    }
    let digits = format!("{:.0}", value.abs().trunc()).len();
    digits > usize::try_from(max_digits).unwrap_or(usize::MAX)
}
