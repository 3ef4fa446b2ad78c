//! Measurements and batches
//!
//! The serialized shape of [`Batch`] is the contract consumed by exporters and
//! query layers: camel-case top-level keys and five dotted attribute keys on
//! every measurement.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::metric::MetricName;
use crate::types::AnomalyKind;

/// The five attributes carried by every measurement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeasurementAttributes {
    /// Site identifier
    #[serde(rename = "site.id")]
    pub site_id: String,
    /// Site display name
    #[serde(rename = "site.name")]
    pub site_name: String,
    /// Region code
    pub region: String,
    /// Device archetype name
    #[serde(rename = "device.type")]
    pub device_type: String,
    /// Device identifier
    #[serde(rename = "device.id")]
    pub device_id: String,
}

impl MeasurementAttributes {
    /// Attribute keys in their fixed order
    pub const KEYS: [&'static str; 5] = ["site.id", "site.name", "region", "device.type", "device.id"];

    /// Key/value pairs in [`Self::KEYS`] order
    pub fn pairs(&self) -> [(&'static str, &str); 5] {
        [
            ("site.id", self.site_id.as_str()),
            ("site.name", self.site_name.as_str()),
            ("region", self.region.as_str()),
            ("device.type", self.device_type.as_str()),
            ("device.id", self.device_id.as_str()),
        ]
    }

    /// Look up an attribute by its dotted key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs().into_iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// True when every attribute is non-empty
    pub fn is_complete(&self) -> bool {
        self.pairs().iter().all(|(_, value)| !value.is_empty())
    }
}

/// One named numeric observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    /// Dotted metric identifier
    pub name: MetricName,
    /// Observed value
    pub value: f64,
    /// Capture time in milliseconds since the Unix epoch
    pub timestamp_ms: i64,
    /// Site and device attributes
    pub attributes: MeasurementAttributes,
}

/// All measurements produced for one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    /// Measurements in generation order (site-major, archetype-minor)
    pub measurements: Vec<Measurement>,
    /// Step index that produced this batch
    pub step_index: u64,
    /// One label per recording device; repeats are intentional
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anomalies_injected: Vec<AnomalyKind>,
}

impl Batch {
    /// Number of measurements in the batch
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    /// True when the batch holds no measurements
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Values of one metric, in generation order
    pub fn values_of(&self, metric: MetricName) -> Vec<f64> {
        self.measurements
            .iter()
            .filter(|m| m.name == metric)
            .map(|m| m.value)
            .collect()
    }

    /// Mean of one metric, `None` when the metric is absent
    pub fn mean_of(&self, metric: MetricName) -> Option<f64> {
        let values = self.values_of(metric);
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }

    /// Measurements grouped by device identifier
    pub fn device_readings(&self) -> BTreeMap<String, BTreeMap<MetricName, f64>> {
        let mut readings: BTreeMap<String, BTreeMap<MetricName, f64>> = BTreeMap::new();
        for measurement in &self.measurements {
            readings
                .entry(measurement.attributes.device_id.clone())
                .or_default()
                .insert(measurement.name, measurement.value);
        }
        readings
    }

    /// Capture timestamp shared by every measurement
    pub fn timestamp_ms(&self) -> Option<i64> {
        self.measurements.first().map(|m| m.timestamp_ms)
    }
}
