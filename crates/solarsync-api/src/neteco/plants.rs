// NetEco plant, device, and generation endpoints
//
// All three are authenticated `POST`s carrying the session token and,
// for the per-plant calls, a `plantid` parameter.

use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::neteco::client::NetEcoClient;
use crate::neteco::models::{DeviceDetail, RawDevice, RawPlant, RawSunData};

impl NetEcoClient {
    /// List all plants visible to the authenticated account.
    ///
    /// `POST {base}/queryPlantList`. A missing or `null` `resultData`
    /// is returned as an empty list.
    pub async fn query_plant_list(&self, token: &str) -> Result<Vec<RawPlant>, Error> {
        debug!("listing plants");
        let plants = self
            .query::<Vec<RawPlant>>("queryPlantList", token, &[])
            .await?
            .into_result()?;
        Ok(plants.unwrap_or_default())
    }

    /// List the devices registered under one plant.
    ///
    /// `POST {base}/queryDeviceList?plantid=..`
    pub async fn query_device_list(
        &self,
        token: &str,
        plant_id: &str,
    ) -> Result<Vec<RawDevice>, Error> {
        debug!(plant_id, "listing devices");
        let devices = self
            .query::<Vec<RawDevice>>("queryDeviceList", token, &[("plantid", plant_id)])
            .await?
            .into_result()?;
        Ok(devices.unwrap_or_default())
    }

    /// Fetch today's generation for every device of one plant.
    ///
    /// `POST {base}/queryDeviceDetail?plantid=..`. Absence of
    /// `resultSunData` means the plant has no data yet and yields an
    /// empty list.
    pub async fn query_device_detail(
        &self,
        token: &str,
        plant_id: &str,
    ) -> Result<Vec<RawSunData>, Error> {
        debug!(plant_id, "fetching device generation");
        let detail = self
            .query::<Value>("queryDeviceDetail", token, &[("plantid", plant_id)])
            .await?
            .into_result()?;

        // Some firmware answers `"resultData": []` when a plant has no data.
        let Some(value @ Value::Object(_)) = detail else {
            return Ok(Vec::new());
        };
        let detail: DeviceDetail =
            serde_json::from_value(value).map_err(|e| Error::Deserialization {
                message: format!("queryDeviceDetail: {e}"),
                body: String::new(),
            })?;
        Ok(detail.sun_data.unwrap_or_default())
    }
}
