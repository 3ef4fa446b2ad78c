//! Core types and identifiers for the telemetry simulator
//!
//! This module contains the fixed enumerations, identifiers, and configuration
//! structures used throughout the simulator.
//!
//! # Overview
//!
//! - **Enums**: device archetypes, regions, anomaly kinds, output formats
//! - **Identifiers**: deterministic device identifiers and per-run UUIDs
//! - **Configuration**: simulator configuration with validation and CLI support
//!
//! # Usage Example
//!
//! ```rust
//! use iot_telemetry_simulator::types::*;
//!
//! let device_id = DeviceId::derive("HOSP-001", DeviceArchetype::ChemicalDosingPump, 2);
//! assert_eq!(device_id.as_str(), "HOSP-001-PUMP-2");
//!
//! let config = SimulatorConfig {
//!     seed: 7,
//!     anomaly: Some("pump_failure".to_string()),
//!     ..Default::default()
//! };
//! assert_eq!(config.anomaly_kind(), Some(AnomalyKind::PumpFailure));
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
