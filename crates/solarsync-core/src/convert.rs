// ── API-to-domain type conversions ──
//
// Bridges raw `solarsync_api` wire records into the canonical domain
// types. Identity fields that are missing make a record unusable and
// are reported as `MissingField`; numeric fields that are missing or
// garbage fall back to "no value".

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use solarsync_api::{RawDevice, RawPlant, RawSunData};

use crate::model::{Device, Plant, Reading};

/// A wire record lacked a field required to identify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("missing {0}")]
pub struct MissingField(pub &'static str);

// ── Hierarchy records ────────────────────────────────────────────────

/// A plant needs an id; its name falls back to the id.
pub fn plant_from_raw(raw: RawPlant) -> Result<Plant, MissingField> {
    let id = raw.plant_id.ok_or(MissingField("plantid"))?;
    let name = raw.plant_name.unwrap_or_else(|| id.clone());
    Ok(Plant { id, name })
}

/// A device needs a logger, an id, and a name. A record without a
/// `plantid` belongs to the plant it was listed under.
pub fn device_from_raw(raw: RawDevice, listed_under: &str) -> Result<Device, MissingField> {
    let logger_name = raw.logger_name.ok_or(MissingField("SmartLogger"))?;
    let id = raw.device_id.ok_or(MissingField("deviceid"))?;
    let name = raw.device_name.ok_or(MissingField("deviceName"))?;
    let plant_id = raw.plant_id.unwrap_or_else(|| listed_under.to_owned());
    Ok(Device {
        plant_id,
        logger_name,
        id,
        name,
    })
}

// ── Generation data ──────────────────────────────────────────────────

/// Convert one `resultSunData` row. Rows without a device id cannot be
/// attributed and are dropped.
pub fn reading_from_raw(raw: RawSunData) -> Result<Reading, MissingField> {
    let device_id = raw.device_id.ok_or(MissingField("deviceid"))?;
    let generation = parse_generation(raw.daily_power_generation.as_ref());
    if generation.is_none() {
        debug!(
            device_id = %device_id,
            raw = ?raw.daily_power_generation,
            "no usable dailyPowerGeneration, counting as zero"
        );
    }
    Ok(Reading::new(device_id, generation))
}

/// Interpret a `dailyPowerGeneration` value.
///
/// Numbers and numeric strings are accepted; `null`, empty strings,
/// non-numeric text, non-finite and negative values yield `None`.
pub fn parse_generation(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    if !parsed.is_finite() {
        return None;
    }
    if parsed < 0.0 {
        warn!(value = parsed, "negative generation value ignored");
        return None;
    }
    Some(parsed)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn generation_accepts_numbers_and_numeric_strings() {
        assert_eq!(parse_generation(Some(&json!(12.5))), Some(12.5));
        assert_eq!(parse_generation(Some(&json!(3))), Some(3.0));
        assert_eq!(parse_generation(Some(&json!(" 7.25 "))), Some(7.25));
    }

    #[test]
    fn generation_rejects_garbage() {
        assert_eq!(parse_generation(None), None);
        assert_eq!(parse_generation(Some(&Value::Null)), None);
        assert_eq!(parse_generation(Some(&json!(""))), None);
        assert_eq!(parse_generation(Some(&json!("n/a"))), None);
        assert_eq!(parse_generation(Some(&json!("NaN"))), None);
        assert_eq!(parse_generation(Some(&json!("inf"))), None);
        assert_eq!(parse_generation(Some(&json!(-1.0))), None);
        assert_eq!(parse_generation(Some(&json!([1.0]))), None);
    }

    #[test]
    fn plant_name_falls_back_to_id() {
        let plant = plant_from_raw(RawPlant {
            plant_id: Some("P1".into()),
            plant_name: None,
        })
        .ok();
        assert_eq!(
            plant,
            Some(Plant {
                id: "P1".into(),
                name: "P1".into()
            })
        );
    }

    #[test]
    fn plant_without_id_is_rejected() {
        let result = plant_from_raw(RawPlant {
            plant_id: None,
            plant_name: Some("Orphan".into()),
        });
        assert_eq!(result, Err(MissingField("plantid")));
    }

    #[test]
    fn device_inherits_listing_plant() {
        let device = device_from_raw(
            RawDevice {
                plant_id: None,
                logger_name: Some("SL-01".into()),
                device_id: Some("D1".into()),
                device_name: Some("INV-1".into()),
            },
            "P9",
        )
        .ok();
        assert_eq!(device.map(|d| d.plant_id), Some("P9".to_owned()));
    }

    #[test]
    fn device_without_logger_is_rejected() {
        let result = device_from_raw(
            RawDevice {
                plant_id: Some("P1".into()),
                logger_name: None,
                device_id: Some("D1".into()),
                device_name: Some("INV-1".into()),
            },
            "P1",
        );
        assert_eq!(result, Err(MissingField("SmartLogger")));
    }

    #[test]
    fn reading_with_bad_value_is_kept_as_none() {
        let reading = reading_from_raw(RawSunData {
            device_id: Some("D1".into()),
            daily_power_generation: Some(json!("")),
        })
        .ok();
        assert_eq!(reading, Some(Reading::new("D1", None)));
    }
}
