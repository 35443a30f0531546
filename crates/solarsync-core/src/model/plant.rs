// ── Plant hierarchy domain types ──

use serde::{Deserialize, Serialize};

/// A top-level solar site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plant {
    pub id: String,
    pub name: String,
}

/// An inverter (or meter) reporting through a logger.
///
/// Several devices of the same plant may share one `logger_name`; the
/// logger is the unit generation is reported under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub plant_id: String,
    pub logger_name: String,
    pub id: String,
    pub name: String,
}
