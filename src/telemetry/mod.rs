//! Deterministic telemetry generation
//!
//! This module turns a `(seed, step_index, anomaly)` triple into a [`Batch`] of
//! 36 measurements: three fixed sites, each running one device of every
//! archetype, each device emitting four named metrics.
//!
//! # Overview
//!
//! - **rng**: Mulberry32 seeded random source with 32-bit wraparound arithmetic
//! - **site**: the fixed site table
//! - **metric**: the closed set of ten metric names and per-archetype slots
//! - **measurement**: measurement, attribute, and batch records
//! - **anomaly**: the (archetype, anomaly) effect table
//! - **generator**: batch generation
//!
//! # Usage Example
//!
//! ```rust
//! use iot_telemetry_simulator::telemetry::{generate_batch_at, MetricName};
//! use iot_telemetry_simulator::types::AnomalyKind;
//!
//! let baseline = generate_batch_at(99, 0, None, 0);
//! let degraded = generate_batch_at(99, 0, Some(AnomalyKind::Underdosing), 0);
//!
//! assert_eq!(baseline.len(), 36);
//! assert!(
//!     degraded.mean_of(MetricName::ChemicalDosingRate) < baseline.mean_of(MetricName::ChemicalDosingRate)
//! );
//! ```

pub mod anomaly;
pub mod generator;
pub mod measurement;
pub mod metric;
pub mod rng;
pub mod site;

pub use anomaly::{affected_archetypes, effect_for, recording_archetype, AnomalyEffect, EFFECTS};
pub use generator::{
    archetype_baselines, generate_batch, generate_batch_at, generate_batch_from_selector, Baseline,
    MEASUREMENTS_PER_BATCH, MEASUREMENTS_PER_DEVICE,
};
pub use measurement::{Batch, Measurement, MeasurementAttributes};
pub use metric::{archetype_metrics, metric_names, MetricName};
pub use rng::Mulberry32;
pub use site::{site_names, Site, SITES};
