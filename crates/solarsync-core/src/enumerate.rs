// ── Hierarchy enumerator ──
//
// Discovers plants and their devices for one credential set. A failed
// plant list aborts the set; a failed device list only loses that
// plant's devices.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::convert::{device_from_raw, plant_from_raw};
use crate::error::CoreError;
use crate::model::{Device, Plant};
use crate::session::SessionManager;

/// Plants and devices discovered in one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hierarchy {
    pub plants: Vec<Plant>,
    pub devices: Vec<Device>,
}

impl Hierarchy {
    /// Device id → logger name, used to attribute readings.
    pub fn logger_index(&self) -> HashMap<String, String> {
        self.devices
            .iter()
            .map(|d| (d.id.clone(), d.logger_name.clone()))
            .collect()
    }

    pub fn plant_ids(&self) -> Vec<String> {
        self.plants.iter().map(|p| p.id.clone()).collect()
    }

    pub fn plant(&self, id: &str) -> Option<&Plant> {
        self.plants.iter().find(|p| p.id == id)
    }

    /// Distinct logger names across all devices.
    pub fn logger_count(&self) -> usize {
        self.devices
            .iter()
            .map(|d| d.logger_name.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Walks the plant → device hierarchy through an authenticated session.
pub struct Enumerator<'a> {
    session: &'a SessionManager,
}

impl<'a> Enumerator<'a> {
    pub fn new(session: &'a SessionManager) -> Self {
        Self { session }
    }

    /// All plants visible to the account. Records without an id are
    /// dropped.
    pub async fn list_plants(&self) -> Result<Vec<Plant>, CoreError> {
        let client = self.session.client();
        let raw = self
            .session
            .authorized(|s| async move { client.query_plant_list(s.token()).await })
            .await?;

        let plants: Vec<Plant> = raw
            .into_iter()
            .filter_map(|record| match plant_from_raw(record) {
                Ok(plant) => Some(plant),
                Err(missing) => {
                    warn!(host = %self.session.host(), %missing, "dropping plant record");
                    None
                }
            })
            .collect();

        if plants.is_empty() {
            warn!(host = %self.session.host(), "plant list is empty");
        }
        Ok(plants)
    }

    /// Devices listed under one plant. Incomplete records are dropped.
    pub async fn list_devices(&self, plant_id: &str) -> Result<Vec<Device>, CoreError> {
        let client = self.session.client();
        let raw = self
            .session
            .authorized(|s| async move { client.query_device_list(s.token(), plant_id).await })
            .await?;

        Ok(raw
            .into_iter()
            .filter_map(|record| match device_from_raw(record, plant_id) {
                Ok(device) => Some(device),
                Err(missing) => {
                    warn!(host = %self.session.host(), plant_id, %missing, "dropping device record");
                    None
                }
            })
            .collect())
    }

    /// Plants plus every device of every plant. Device-list failures
    /// are logged and skipped; devices pointing at a plant that was not
    /// listed are dropped.
    pub async fn enumerate(&self) -> Result<Hierarchy, CoreError> {
        let plants = self.list_plants().await?;
        let known: HashSet<&str> = plants.iter().map(|p| p.id.as_str()).collect();

        let mut devices = Vec::new();
        for plant in &plants {
            match self.list_devices(&plant.id).await {
                Ok(listed) => {
                    debug!(plant_id = %plant.id, count = listed.len(), "devices listed");
                    for device in listed {
                        if known.contains(device.plant_id.as_str()) {
                            devices.push(device);
                        } else {
                            warn!(
                                plant_id = %device.plant_id,
                                device_id = %device.id,
                                "device references unknown plant, dropping"
                            );
                        }
                    }
                }
                Err(e) => {
                    warn!(host = %self.session.host(), plant_id = %plant.id, error = %e, "device list failed");
                }
            }
        }

        info!(
            host = %self.session.host(),
            plants = plants.len(),
            devices = devices.len(),
            "hierarchy enumerated"
        );
        Ok(Hierarchy { plants, devices })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: &str, logger: &str) -> Device {
        Device {
            plant_id: "P1".into(),
            logger_name: logger.into(),
            id: id.into(),
            name: format!("INV-{id}"),
        }
    }

    #[test]
    fn index_maps_devices_to_loggers() {
        let hierarchy = Hierarchy {
            plants: vec![Plant {
                id: "P1".into(),
                name: "Kobe".into(),
            }],
            devices: vec![device("D1", "SL-A"), device("D2", "SL-A"), device("D3", "SL-B")],
        };

        let index = hierarchy.logger_index();
        assert_eq!(index.get("D2").map(String::as_str), Some("SL-A"));
        assert_eq!(index.get("D3").map(String::as_str), Some("SL-B"));
        assert_eq!(hierarchy.logger_count(), 2);
        assert_eq!(hierarchy.plant("P1").map(|p| p.name.as_str()), Some("Kobe"));
    }
}
