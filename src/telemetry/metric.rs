//! Metric names and per-archetype metric slots
//!
//! Every measurement name is one of ten stable dotted identifiers. Downstream
//! query layers key on these strings, so they never change.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::types::DeviceArchetype;

/// The closed set of measurement names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricName {
    /// `chemical.dosing_rate_lpm`
    ChemicalDosingRate,
    /// `chemical.tank_level_pct`
    ChemicalTankLevel,
    /// `chemical.conductivity_uS`
    ChemicalConductivity,
    /// `sanitation.cycle_count`
    SanitationCycleCount,
    /// `sanitation.water_temp_c`
    SanitationWaterTemp,
    /// `sanitation.sanitizer_ppm`
    SanitationSanitizer,
    /// `water.ph`
    WaterPh,
    /// `water.conductivity_uS`
    WaterConductivity,
    /// `water.flow_rate_lpm`
    WaterFlowRate,
    /// `device.status`
    DeviceStatus,
}

impl MetricName {
    /// All metric names in their fixed order
    pub const ALL: [MetricName; 10] = [
        MetricName::ChemicalDosingRate,
        MetricName::ChemicalTankLevel,
        MetricName::ChemicalConductivity,
        MetricName::SanitationCycleCount,
        MetricName::SanitationWaterTemp,
        MetricName::SanitationSanitizer,
        MetricName::WaterPh,
        MetricName::WaterConductivity,
        MetricName::WaterFlowRate,
        MetricName::DeviceStatus,
    ];

    /// Dotted metric identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::ChemicalDosingRate => "chemical.dosing_rate_lpm",
            MetricName::ChemicalTankLevel => "chemical.tank_level_pct",
            MetricName::ChemicalConductivity => "chemical.conductivity_uS",
            MetricName::SanitationCycleCount => "sanitation.cycle_count",
            MetricName::SanitationWaterTemp => "sanitation.water_temp_c",
            MetricName::SanitationSanitizer => "sanitation.sanitizer_ppm",
            MetricName::WaterPh => "water.ph",
            MetricName::WaterConductivity => "water.conductivity_uS",
            MetricName::WaterFlowRate => "water.flow_rate_lpm",
            MetricName::DeviceStatus => "device.status",
        }
    }
}

/// The ten metric names in their fixed order
pub fn metric_names() -> [&'static str; 10] {
    MetricName::ALL.map(|metric| metric.as_str())
}

/// The four metrics an archetype emits, in emission order
pub fn archetype_metrics(archetype: DeviceArchetype) -> [MetricName; 4] {
    match archetype {
        DeviceArchetype::ChemicalDosingPump => [
            MetricName::ChemicalDosingRate,
            MetricName::ChemicalTankLevel,
            MetricName::ChemicalConductivity,
            MetricName::DeviceStatus,
        ],
        DeviceArchetype::Dishwasher => [
            MetricName::SanitationCycleCount,
            MetricName::SanitationWaterTemp,
            MetricName::SanitationSanitizer,
            MetricName::DeviceStatus,
        ],
        DeviceArchetype::WaterSystem => [
            MetricName::WaterPh,
            MetricName::WaterConductivity,
            MetricName::WaterFlowRate,
            MetricName::DeviceStatus,
        ],
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricName::ALL
            .iter()
            .copied()
            .find(|metric| metric.as_str() == s)
            .ok_or_else(|| format!("Unknown metric name: {}", s))
    }
}

impl Serialize for MetricName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MetricName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_fixed_order() {
        assert_eq!(
            metric_names(),
            [
                "chemical.dosing_rate_lpm",
                "chemical.tank_level_pct",
                "chemical.conductivity_uS",
                "sanitation.cycle_count",
                "sanitation.water_temp_c",
                "sanitation.sanitizer_ppm",
                "water.ph",
                "water.conductivity_uS",
                "water.flow_rate_lpm",
                "device.status",
            ]
        );
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!("water.ph".parse::<MetricName>(), Ok(MetricName::WaterPh));
        assert!("chemical.conductivity_us".parse::<MetricName>().is_err());
    }

    #[test]
    fn test_every_archetype_ends_with_status() {
        for archetype in DeviceArchetype::ALL {
            assert_eq!(archetype_metrics(archetype)[3], MetricName::DeviceStatus);
        }
    }
}
