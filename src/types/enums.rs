//! Enumeration types for the telemetry simulator
//!
//! This module contains the fixed enumerations the simulator is built around:
//! device archetypes, site regions, injectable anomaly kinds, and output formats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of simulated devices hosted at every site
///
/// Declaration order is the generation order within a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeviceArchetype {
    /// Chemical dosing pump feeding detergent or sanitizer
    ChemicalDosingPump,
    /// Sanitation / wash station
    Dishwasher,
    /// Water treatment and distribution system
    WaterSystem,
}

impl DeviceArchetype {
    /// All archetypes in declaration order
    pub const ALL: [DeviceArchetype; 3] = [
        DeviceArchetype::ChemicalDosingPump,
        DeviceArchetype::Dishwasher,
        DeviceArchetype::WaterSystem,
    ];

    /// Stable attribute value for `device.type`
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceArchetype::ChemicalDosingPump => "ChemicalDosingPump",
            DeviceArchetype::Dishwasher => "Dishwasher",
            DeviceArchetype::WaterSystem => "WaterSystem",
        }
    }

    /// Short code used when deriving device identifiers
    pub fn code(&self) -> &'static str {
        match self {
            DeviceArchetype::ChemicalDosingPump => "PUMP",
            DeviceArchetype::Dishwasher => "DISH",
            DeviceArchetype::WaterSystem => "WATER",
        }
    }
}

impl fmt::Display for DeviceArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DeviceArchetype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chemicaldosingpump" | "chemical_dosing_pump" | "chemical dosing pump" | "pump" => {
                Ok(DeviceArchetype::ChemicalDosingPump)
            }
            "dishwasher" | "sanitation" | "wash station" => Ok(DeviceArchetype::Dishwasher),
            "watersystem" | "water_system" | "water system" | "water" => {
                Ok(DeviceArchetype::WaterSystem)
            }
            _ => Err(format!("Unknown device archetype: {}", s)),
        }
    }
}

/// Geographic region codes, one fixed per site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// North America
    #[serde(rename = "NA")]
    NorthAmerica,
    /// Europe, Middle East and Africa
    #[serde(rename = "EMEA")]
    Emea,
    /// Asia-Pacific
    #[serde(rename = "APAC")]
    Apac,
}

impl Region {
    /// Stable attribute value for `region`
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::NorthAmerica => "NA",
            Region::Emea => "EMEA",
            Region::Apac => "APAC",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NA" => Ok(Region::NorthAmerica),
            "EMEA" => Ok(Region::Emea),
            "APAC" => Ok(Region::Apac),
            _ => Err(format!("Unknown region: {}", s)),
        }
    }
}

/// Fault modes that can be injected into a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Dosing pump delivers too little chemical
    Underdosing,
    /// Device stops; status forced to zero
    PumpFailure,
    /// Chemical tank loses level
    TankLeak,
    /// Wash water overheats
    ThermalHigh,
    /// Wash water fails to reach sanitizing temperature
    ThermalLow,
}

impl AnomalyKind {
    /// All anomaly kinds in declaration order
    pub const ALL: [AnomalyKind; 5] = [
        AnomalyKind::Underdosing,
        AnomalyKind::PumpFailure,
        AnomalyKind::TankLeak,
        AnomalyKind::ThermalHigh,
        AnomalyKind::ThermalLow,
    ];

    /// Label recorded in `anomaliesInjected`
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::Underdosing => "underdosing",
            AnomalyKind::PumpFailure => "pump_failure",
            AnomalyKind::TankLeak => "tank_leak",
            AnomalyKind::ThermalHigh => "thermal_high",
            AnomalyKind::ThermalLow => "thermal_low",
        }
    }

    /// Permissive selector parsing
    ///
    /// Unknown, blank, or `none` selectors degrade to "no anomaly" instead of
    /// failing. Use [`str::parse`] when a typo should be an error.
    pub fn from_selector(selector: &str) -> Option<Self> {
        selector.trim().parse().ok()
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AnomalyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "underdosing" => Ok(AnomalyKind::Underdosing),
            "pump_failure" => Ok(AnomalyKind::PumpFailure),
            "tank_leak" => Ok(AnomalyKind::TankLeak),
            "thermal_high" => Ok(AnomalyKind::ThermalHigh),
            "thermal_low" => Ok(AnomalyKind::ThermalLow),
            _ => Err(format!("Unknown anomaly kind: {}", s)),
        }
    }
}

/// Output format for generated batches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    /// One JSON batch object per line
    Json,
    /// One CSV row per measurement
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" | "jsonl" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archetype_names_are_stable() {
        let names: Vec<&str> = DeviceArchetype::ALL.iter().map(|a| a.as_str()).collect();
        assert_eq!(names, vec!["ChemicalDosingPump", "Dishwasher", "WaterSystem"]);
    }

    #[test]
    fn test_anomaly_strict_parsing() {
        assert_eq!("pump_failure".parse::<AnomalyKind>(), Ok(AnomalyKind::PumpFailure));
        assert_eq!("Thermal-High".parse::<AnomalyKind>(), Ok(AnomalyKind::ThermalHigh));
        assert!("overheat".parse::<AnomalyKind>().is_err());
    }

    #[test]
    fn test_anomaly_selector_is_permissive() {
        assert_eq!(AnomalyKind::from_selector(" tank_leak "), Some(AnomalyKind::TankLeak));
        assert_eq!(AnomalyKind::from_selector("none"), None);
        assert_eq!(AnomalyKind::from_selector(""), None);
        assert_eq!(AnomalyKind::from_selector("meltdown"), None);
    }

    #[test]
    fn test_anomaly_serde_labels() {
        let json = serde_json::to_string(&AnomalyKind::ThermalLow).unwrap();
        assert_eq!(json, "\"thermal_low\"");
        let back: AnomalyKind = serde_json::from_str("\"underdosing\"").unwrap();
        assert_eq!(back, AnomalyKind::Underdosing);
    }

    #[test]
    fn test_region_serde_codes() {
        assert_eq!(serde_json::to_string(&Region::Emea).unwrap(), "\"EMEA\"");
        assert_eq!("apac".parse::<Region>(), Ok(Region::Apac));
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("jsonl".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("csv".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
