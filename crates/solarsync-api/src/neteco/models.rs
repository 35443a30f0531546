// NetEco open API wire models
//
// Every query endpoint answers with the same outer envelope:
// `{ "success": bool?, "failCode": int?, "message": str?, "resultData": T? }`.
// Identifier fields arrive as strings on some firmware and as numbers
// on others, so they are normalized to trimmed strings here. Records stay
// "raw" (all fields optional); dropping incomplete records is a business
// decision left to `solarsync-core`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::Error;

/// Vendor fail code: too many users are logged in with this account.
pub const FAIL_CODE_CONCURRENT_LOGIN: i64 = 20400;

/// Vendor fail code: the token is unknown or has expired.
pub const FAIL_CODE_SESSION_EXPIRED: i64 = 305;

// ── Envelope ────────────────────────────────────────────────────────

/// Outer response envelope shared by all query endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: Option<bool>,
    pub fail_code: Option<i64>,
    pub message: Option<String>,
    pub result_data: Option<T>,
}

/// A parsed vendor response, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum VendorResponse<T> {
    /// `resultData` present.
    Data(T),
    /// Success envelope without `resultData` (or with `null`).
    Empty,
    /// `success: false` or a non-zero `failCode`.
    Failure {
        fail_code: Option<i64>,
        message: String,
    },
}

impl<T> From<Envelope<T>> for VendorResponse<T> {
    fn from(envelope: Envelope<T>) -> Self {
        let failed = envelope.success == Some(false)
            || envelope.fail_code.is_some_and(|code| code != 0);
        if failed {
            return Self::Failure {
                fail_code: envelope.fail_code,
                message: envelope.message.unwrap_or_else(|| "no message".into()),
            };
        }
        envelope.result_data.map_or(Self::Empty, Self::Data)
    }
}

impl<T> VendorResponse<T> {
    /// Collapse into a `Result`, mapping failure envelopes to typed errors.
    ///
    /// `Ok(None)` is the valid "no data" outcome.
    pub fn into_result(self) -> Result<Option<T>, Error> {
        match self {
            Self::Data(data) => Ok(Some(data)),
            Self::Empty => Ok(None),
            Self::Failure {
                fail_code: Some(FAIL_CODE_SESSION_EXPIRED),
                ..
            } => Err(Error::SessionExpired),
            Self::Failure { fail_code, message } => Err(Error::Vendor { fail_code, message }),
        }
    }
}

// ── Login ───────────────────────────────────────────────────────────

/// Login response. Success carries the token under `openApiroarand`;
/// failure uses the usual `success`/`failCode` fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(rename = "openApiroarand")]
    pub token: Option<String>,
    pub success: Option<bool>,
    pub fail_code: Option<i64>,
    pub message: Option<String>,
}

// ── Records ─────────────────────────────────────────────────────────

/// One entry of `queryPlantList.resultData`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlant {
    #[serde(default, rename = "plantid", deserialize_with = "lenient_string")]
    pub plant_id: Option<String>,
    #[serde(default, rename = "plantName", deserialize_with = "lenient_string")]
    pub plant_name: Option<String>,
}

/// One entry of `queryDeviceList.resultData`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDevice {
    #[serde(default, rename = "plantid", deserialize_with = "lenient_string")]
    pub plant_id: Option<String>,
    #[serde(default, rename = "SmartLogger", deserialize_with = "lenient_string")]
    pub logger_name: Option<String>,
    #[serde(default, rename = "deviceid", deserialize_with = "lenient_string")]
    pub device_id: Option<String>,
    #[serde(default, rename = "deviceName", deserialize_with = "lenient_string")]
    pub device_name: Option<String>,
}

/// `queryDeviceDetail.resultData`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceDetail {
    #[serde(default, rename = "resultSunData")]
    pub sun_data: Option<Vec<RawSunData>>,
}

/// One entry of `queryDeviceDetail.resultData.resultSunData`.
///
/// The generation value is kept as raw JSON: vendors send numbers,
/// numeric strings, empty strings, or `null`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSunData {
    #[serde(default, rename = "deviceid", deserialize_with = "lenient_string")]
    pub device_id: Option<String>,
    #[serde(default, rename = "dailyPowerGeneration")]
    pub daily_power_generation: Option<Value>,
}

/// Accept a string or number, normalize to a trimmed non-empty string.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
