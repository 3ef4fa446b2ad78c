//! Simulation control around the generator
//!
//! This module contains the export trigger, its step counter, batch output,
//! statistics collection, logging setup, and error handling.
//!
//! # Overview
//!
//! - **SimulationRunner**: claims step indices and writes one batch per step
//! - **StepCounter**: caller-owned monotonically increasing step index
//! - **BatchWriter**: JSON Lines or CSV output to any byte sink
//! - **RunStatistics**: per-run counts and per-metric summaries
//! - **SimulationError**: error handling for everything outside the generator
//!
//! # Usage Example
//!
//! ```rust
//! use iot_telemetry_simulator::simulation::*;
//! use iot_telemetry_simulator::types::*;
//!
//! let config = SimulatorConfig { steps: 3, ..Default::default() };
//! let mut runner = SimulationRunner::new(config).unwrap();
//! let mut writer = BatchWriter::new(Vec::new(), OutputFormat::Json);
//!
//! let stats = runner.run(&mut writer).unwrap();
//! assert_eq!(stats.batches_generated, 3);
//! assert_eq!(stats.measurements_written, 108);
//! ```

pub mod error;
pub mod logging;
pub mod output;
pub mod runner;
pub mod statistics;
pub mod step_counter;

// Re-export all public types for convenience
pub use error::*;
pub use logging::*;
pub use output::*;
pub use runner::*;
pub use statistics::*;
pub use step_counter::*;
