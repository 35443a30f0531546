// ── Generation readings ──

use serde::{Deserialize, Serialize};

/// One device's daily generation as fetched.
///
/// `daily_generation` is `None` when the vendor sent nothing usable;
/// aggregation counts that as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub device_id: String,
    pub daily_generation: Option<f64>,
}

impl Reading {
    pub fn new(device_id: impl Into<String>, daily_generation: Option<f64>) -> Self {
        Self {
            device_id: device_id.into(),
            daily_generation,
        }
    }

    /// The value contributed to a logger total.
    pub fn value(&self) -> f64 {
        self.daily_generation.unwrap_or(0.0)
    }
}

/// Sum of all readings attributed to one logger, rounded to 3 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedLoggerReading {
    pub logger_name: String,
    pub total: f64,
}
