// ── Logger aggregation ──
//
// Pure: sums readings per logger name. Readings from devices missing
// from the index are kept under their own device id.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::warn;

use crate::model::{AggregatedLoggerReading, Reading};

/// Aggregated totals plus the device ids that had no logger mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    /// One entry per logger, ordered by logger name.
    pub readings: Vec<AggregatedLoggerReading>,
    /// Sorted and de-duplicated.
    pub unmapped_device_ids: Vec<String>,
}

/// Round to 3 decimals, halves away from zero.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

pub fn aggregate<I>(index: &HashMap<String, String>, readings: I) -> Aggregation
where
    I: IntoIterator<Item = Reading>,
{
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    let mut unmapped: BTreeSet<String> = BTreeSet::new();

    for reading in readings {
        let value = reading.value();
        let logger = match index.get(&reading.device_id) {
            Some(logger) => logger.clone(),
            None => {
                if unmapped.insert(reading.device_id.clone()) {
                    warn!(
                        device_id = %reading.device_id,
                        unmapped = true,
                        "device has no logger mapping, reporting under its own id"
                    );
                }
                reading.device_id
            }
        };
        *totals.entry(logger).or_insert(0.0) += value;
    }

    Aggregation {
        readings: totals
            .into_iter()
            .map(|(logger_name, total)| AggregatedLoggerReading {
                logger_name,
                total: round3(total),
            })
            .collect(),
        unmapped_device_ids: unmapped.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]

    use pretty_assertions::assert_eq;

    use super::*;

    fn index(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(d, l)| ((*d).to_owned(), (*l).to_owned()))
            .collect()
    }

    fn entry(logger: &str, total: f64) -> AggregatedLoggerReading {
        AggregatedLoggerReading {
            logger_name: logger.into(),
            total,
        }
    }

    #[test]
    fn shared_logger_sums_devices() {
        let index = index(&[("A", "LoggerX"), ("B", "LoggerX")]);
        let readings = vec![
            Reading::new("A", Some(10.0)),
            Reading::new("A", Some(5.5)),
            Reading::new("B", None),
        ];

        let result = aggregate(&index, readings);

        assert_eq!(result.readings, vec![entry("LoggerX", 15.5)]);
        assert!(result.unmapped_device_ids.is_empty());
    }

    #[test]
    fn output_sorted_by_logger() {
        let index = index(&[("d1", "zeta"), ("d2", "alpha")]);
        let result = aggregate(
            &index,
            vec![Reading::new("d1", Some(1.0)), Reading::new("d2", Some(2.0))],
        );
        let names: Vec<&str> = result.readings.iter().map(|r| r.logger_name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn order_independent() {
        let index = index(&[("a", "L1"), ("b", "L2"), ("c", "L1")]);
        let readings = vec![
            Reading::new("a", Some(0.1)),
            Reading::new("b", Some(0.2)),
            Reading::new("c", Some(0.3)),
            Reading::new("x", Some(4.0)),
        ];
        let mut reversed = readings.clone();
        reversed.reverse();

        assert_eq!(aggregate(&index, readings), aggregate(&index, reversed));
    }

    #[test]
    fn unmapped_device_reported_under_own_id() {
        let result = aggregate(
            &HashMap::new(),
            vec![Reading::new("D9", Some(2.5)), Reading::new("D9", Some(1.0))],
        );
        assert_eq!(result.readings, vec![entry("D9", 3.5)]);
        assert_eq!(result.unmapped_device_ids, vec!["D9".to_owned()]);
    }

    #[test]
    fn totals_rounded_to_three_decimals() {
        let index = index(&[("a", "L")]);
        let result = aggregate(
            &index,
            vec![Reading::new("a", Some(0.1)), Reading::new("a", Some(0.2))],
        );
        assert_eq!(result.readings, vec![entry("L", 0.3)]);
        assert_eq!(round3(1.234_56), 1.235);
        assert_eq!(round3(2.25), 2.25);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(aggregate(&HashMap::new(), Vec::new()), Aggregation::default());
    }
}
