//! Query-layer fallback contract
//!
//! Generated batches are stored by backends whose schema convention is not
//! known up front. This module describes the candidate conventions, tries them
//! in priority order, and provides an in-process backend.
//!
//! # Usage Example
//!
//! ```rust
//! use iot_telemetry_simulator::query::*;
//! use iot_telemetry_simulator::telemetry::{generate_batch_at, MetricName};
//!
//! // A backend that settled into the third convention
//! let mut store = InMemoryMetricStore::new();
//! store.ingest_batch(&generate_batch_at(1, 0, None, 0), &FieldMapping::candidates()[2]);
//!
//! let outcome = FallbackQuery::new()
//!     .run(&store, &MetricQuery::new(MetricName::WaterPh))
//!     .unwrap();
//! assert_eq!(outcome.mapping_label(), Some("labels"));
//! assert_eq!(outcome.rows.len(), 3);
//! ```

pub mod fallback;
pub mod mapping;
pub mod memory;

pub use fallback::*;
pub use mapping::*;
pub use memory::*;
