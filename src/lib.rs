//! IoT Telemetry Simulator
//!
//! A deterministic telemetry generator for commercial chemical dosing,
//! sanitation, and water-treatment equipment, with injectable faults, intended
//! to feed observability pipelines and exercise downstream query layers.
//!
//! # Overview
//!
//! Every batch is a pure function of `(seed, step_index, anomaly)`: three
//! fixed sites each run one device of every archetype, and every device emits
//! four named metrics, 36 measurements in total. Only the capture timestamp is
//! taken from the wall clock.
//!
//! ## Key Features
//!
//! - **Bit-exact randomness**: a Mulberry32 source with 32-bit wraparound arithmetic
//! - **Fault injection**: an auditable (archetype, anomaly) effect table
//! - **Stable contract**: ten fixed metric names and five fixed attribute keys
//! - **Query fallback**: candidate schema conventions tried in priority order
//! - **Export trigger**: a step-claiming runner writing JSON Lines or CSV
//!
//! ## Quick Start
//!
//! ```rust
//! use iot_telemetry_simulator::*;
//!
//! let batch = generate_batch(42, 0, Some(AnomalyKind::PumpFailure));
//! assert_eq!(batch.len(), 36);
//! assert_eq!(batch.anomalies_injected.len(), 3);
//!
//! // Same inputs, same values
//! let again = generate_batch_at(42, 0, Some(AnomalyKind::PumpFailure), batch.timestamp_ms().unwrap());
//! assert_eq!(batch, again);
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: Enumerations, identifiers, and configuration
//! - [`telemetry`]: Random source, sites, metrics, anomalies, and batch generation
//! - [`query`]: Schema conventions and the query fallback contract
//! - [`simulation`]: Runner, step counter, output, statistics, logging, errors
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Types     │    │  Telemetry  │    │    Query    │
//! │             │    │             │    │             │
//! │ Enums       │◄───┤ Generator   │◄───┤ Mappings    │
//! │ Identifiers │    │ Anomalies   │    │ Fallback    │
//! │ Config      │    │ Mulberry32  │    │ Memory store│
//! └─────────────┘    └─────────────┘    └─────────────┘
//!        ▲                   ▲
//!        │                   │
//!        │           ┌─────────────┐
//!        │           │ Simulation  │
//!        └───────────┤             │
//!                    │ Runner      │
//!                    │ Output      │
//!                    │ Statistics  │
//!                    └─────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod query;
pub mod simulation;
pub mod telemetry;
pub mod types;

// Core types and identifiers
pub use types::{
    // Enums
    AnomalyKind,
    // Configuration
    CliArgs,
    ConfigError,
    ConfigValidationError,
    DeviceArchetype,
    // Identifiers
    DeviceId,
    OutputFormat,
    Region,
    RunId,
    SimulatorConfig,
};

// Telemetry generation
pub use telemetry::{
    generate_batch, generate_batch_at, generate_batch_from_selector, metric_names, site_names, Batch,
    Measurement, MeasurementAttributes, MetricName, Mulberry32,
};

// Query layer
pub use query::{FallbackQuery, FieldMapping, InMemoryMetricStore, MetricQuery, MetricSearch, QueryOutcome};

// Simulation types and functionality
pub use simulation::{
    BatchWriter, LoggingConfig, RunStatistics, SimulationError, SimulationResult, SimulationRunner, StepCounter,
};
