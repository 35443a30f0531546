// ── Domain model ──
//
// Canonical, vendor-neutral types produced by the enumerator and fetcher
// and consumed by the aggregator and reporter.

pub mod plant;
pub mod reading;

pub use plant::{Device, Plant};
pub use reading::{AggregatedLoggerReading, Reading};
