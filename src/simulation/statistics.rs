//! Statistics collection and reporting
//!
//! Run statistics are accumulated batch by batch by the export trigger and
//! printed once the run completes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::telemetry::{Batch, MetricName};
use crate::types::{AnomalyKind, RunId};

/// Running count/min/max/mean of one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Number of observed values
    pub count: u64,
    /// Smallest observed value
    pub min: f64,
    /// Largest observed value
    pub max: f64,
    /// Sum of observed values
    pub sum: f64,
}

impl MetricSummary {
    /// Summary holding a single observation
    pub fn from_value(value: f64) -> Self {
        Self { count: 1, min: value, max: value, sum: value }
    }

    /// Fold one more observation in
    pub fn observe(&mut self, value: f64) {
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
    }

    /// Arithmetic mean of the observations
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Statistics for one simulator run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatistics {
    /// Run the statistics belong to
    pub run_id: RunId,
    /// Seed the run generated with
    pub seed: i64,
    /// Wall-clock start of the run
    pub started_at: DateTime<Utc>,
    /// Number of batches generated
    pub batches_generated: u64,
    /// Number of measurements generated
    pub measurements_generated: u64,
    /// Number of batches the output sink accepted
    pub batches_written: u64,
    /// Number of measurements the output sink accepted
    pub measurements_written: u64,
    /// Anomaly labels seen, per kind
    pub anomaly_counts: BTreeMap<AnomalyKind, u64>,
    /// Per-metric value summaries
    pub metrics: BTreeMap<MetricName, MetricSummary>,
    /// First step recorded
    pub first_step: Option<u64>,
    /// Last step recorded
    pub last_step: Option<u64>,
    /// Total duration of the run
    pub run_duration: Duration,
}

impl RunStatistics {
    /// Empty statistics for a run starting now
    pub fn new(run_id: RunId, seed: i64) -> Self {
        Self {
            run_id,
            seed,
            started_at: Utc::now(),
            batches_generated: 0,
            measurements_generated: 0,
            batches_written: 0,
            measurements_written: 0,
            anomaly_counts: BTreeMap::new(),
            metrics: BTreeMap::new(),
            first_step: None,
            last_step: None,
            run_duration: Duration::ZERO,
        }
    }

    /// Record one generated batch
    pub fn record_batch(&mut self, batch: &Batch) {
        self.batches_generated += 1;
        self.measurements_generated += batch.len() as u64;

        for kind in &batch.anomalies_injected {
            *self.anomaly_counts.entry(*kind).or_insert(0) += 1;
        }

        for measurement in &batch.measurements {
            self.metrics
                .entry(measurement.name)
                .and_modify(|summary| summary.observe(measurement.value))
                .or_insert_with(|| MetricSummary::from_value(measurement.value));
        }

        self.first_step = Some(self.first_step.map_or(batch.step_index, |s| s.min(batch.step_index)));
        self.last_step = Some(self.last_step.map_or(batch.step_index, |s| s.max(batch.step_index)));
    }

    /// Record a batch the output sink accepted
    pub fn record_written(&mut self, batch: &Batch) {
        self.batches_written += 1;
        self.measurements_written += batch.len() as u64;
    }

    /// Set the total run duration
    pub fn set_run_duration(&mut self, duration: Duration) {
        self.run_duration = duration;
    }

    /// Total anomaly labels across all kinds
    pub fn total_anomaly_labels(&self) -> u64 {
        self.anomaly_counts.values().sum()
    }

    /// Summary for one metric
    pub fn metric(&self, name: MetricName) -> Option<&MetricSummary> {
        self.metrics.get(&name)
    }

    /// Batches produced per second of run time
    pub fn batches_per_second(&self) -> f64 {
        let secs = self.run_duration.as_secs_f64();
        if secs > 0.0 {
            self.batches_generated as f64 / secs
        } else {
            0.0
        }
    }

    /// One-line summary suitable for logging
    pub fn summary(&self) -> String {
        let steps = match (self.first_step, self.last_step) {
            (Some(first), Some(last)) => format!("steps {}..={}", first, last),
            _ => "no steps".to_string(),
        };
        format!(
            "{}: {} batches generated, {} written, {} measurements written, {} anomaly labels ({})",
            self.run_id,
            self.batches_generated,
            self.batches_written,
            self.measurements_written,
            self.total_anomaly_labels(),
            steps
        )
    }

    /// Multi-line report printed when a run completes
    pub fn generate_summary_output(&self) -> String {
        let mut output = String::new();

        output.push_str("=== Telemetry Simulation Complete ===\n\n");
        output.push_str(&format!("Run: {}\n", self.run_id));
        output.push_str(&format!("Seed: {}\n", self.seed));
        output.push_str(&format!("Started: {}\n", self.started_at.to_rfc3339()));
        output.push_str(&format!("Duration: {:.2} seconds\n\n", self.run_duration.as_secs_f64()));

        output.push_str("Output:\n");
        output.push_str(&format!("  Batches Generated: {}\n", self.batches_generated));
        output.push_str(&format!("  Batches Written: {}\n", self.batches_written));
        output.push_str(&format!("  Measurements Written: {}\n", self.measurements_written));
        output.push_str(&format!("  Throughput: {:.1} batches/s\n", self.batches_per_second()));
        if let (Some(first), Some(last)) = (self.first_step, self.last_step) {
            output.push_str(&format!("  Steps: {} to {}\n", first, last));
        }
        output.push('\n');

        output.push_str("Anomalies Injected:\n");
        if self.anomaly_counts.is_empty() {
            output.push_str("  none\n");
        }
        for (kind, count) in &self.anomaly_counts {
            output.push_str(&format!("  {}: {}\n", kind, count));
        }
        output.push('\n');

        output.push_str("Metrics:\n");
        for (name, summary) in &self.metrics {
            output.push_str(&format!(
                "  {:<26} n={:<6} min={:<10.3} mean={:<10.3} max={:.3}\n",
                name.as_str(),
                summary.count,
                summary.min,
                summary.mean(),
                summary.max
            ));
        }

        output.push_str(&format!("\nSummary: {}\n", self.summary()));
        output
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.generate_summary_output())
    }
}
