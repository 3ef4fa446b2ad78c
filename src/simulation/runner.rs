//! Export trigger
//!
//! The runner owns the step counter and claims exactly one step per trigger.
//! A failed write loses that batch; the step is never re-triggered, so step
//! indices stay unique across the run.

use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

use super::error::SimulationResult;
use super::output::BatchWriter;
use super::statistics::RunStatistics;
use super::step_counter::StepCounter;
use crate::sim_event;
use crate::telemetry::{generate_batch, Batch};
use crate::types::{AnomalyKind, RunId, SimulatorConfig};

/// Drives batch generation for one simulator run
#[derive(Debug)]
pub struct SimulationRunner {
    config: SimulatorConfig,
    run_id: RunId,
    steps: StepCounter,
    statistics: RunStatistics,
}

impl SimulationRunner {
    /// Create a runner from a validated configuration
    #[instrument(skip(config), fields(seed = config.seed, steps = config.steps))]
    pub fn new(config: SimulatorConfig) -> SimulationResult<Self> {
        config.validate()?;

        if config.has_unrecognized_anomaly() {
            warn!(
                selector = config.anomaly.as_deref().unwrap_or_default(),
                "Unknown anomaly selector, generating baseline batches"
            );
        }

        let run_id = RunId::new();
        info!(%run_id, start_step = config.start_step, "Simulation runner initialized");

        Ok(Self {
            steps: StepCounter::new(config.start_step),
            statistics: RunStatistics::new(run_id, config.seed),
            run_id,
            config,
        })
    }

    /// Identifier of this run
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Resolved configuration
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// The step counter this runner advances
    pub fn step_counter(&self) -> &StepCounter {
        &self.steps
    }

    /// Statistics so far
    pub fn statistics(&self) -> &RunStatistics {
        &self.statistics
    }

    /// Consume the runner, keeping its statistics
    pub fn into_statistics(self) -> RunStatistics {
        self.statistics
    }

    /// Claim one step and generate its batch
    ///
    /// Fails with [`SimulationError::StepCounterError`] once every step index
    /// up to `u64::MAX` has been claimed.
    ///
    /// [`SimulationError::StepCounterError`]: super::error::SimulationError::StepCounterError
    pub fn trigger(&mut self, anomaly: Option<AnomalyKind>) -> SimulationResult<Batch> {
        let step = self.steps.next_step()?;
        Ok(self.generate_step(step, anomaly))
    }

    fn generate_step(&mut self, step: u64, anomaly: Option<AnomalyKind>) -> Batch {
        let batch = generate_batch(self.config.seed, step, anomaly);
        self.statistics.record_batch(&batch);

        sim_event!(
            debug,
            "Batch generated",
            step = step,
            measurements = batch.len(),
            anomalies = batch.anomalies_injected.len(),
        );
        batch
    }

    /// Run `config.steps` triggers, writing every batch
    ///
    /// The configured anomaly applies on every step, or only on steps that are
    /// multiples of `anomaly_every` when set.
    #[instrument(skip(self, writer), fields(run_id = %self.run_id, format = %writer.format()))]
    pub fn run<W: Write>(&mut self, writer: &mut BatchWriter<W>) -> SimulationResult<&RunStatistics> {
        let started = Instant::now();
        let interval = Duration::from_millis(self.config.interval_ms);

        info!(
            seed = self.config.seed,
            steps = self.config.steps,
            first_step = ?self.steps.peek(),
            "Starting simulation run"
        );

        for i in 0..self.config.steps {
            if i > 0 && !interval.is_zero() {
                thread::sleep(interval);
            }

            let step = match self.steps.next_step() {
                Ok(step) => step,
                Err(e) => {
                    warn!(category = e.category(), "Stopping run: {}", e);
                    self.statistics.set_run_duration(started.elapsed());
                    return Err(e);
                }
            };
            let anomaly = self.config.anomaly_for_step(step);
            let batch = self.generate_step(step, anomaly);

            if let Err(e) = writer.write_batch(&batch) {
                warn!(step, category = e.category(), recoverable = e.is_recoverable(), "Failed to write batch: {}", e);
                self.statistics.set_run_duration(started.elapsed());
                return Err(e);
            }
            self.statistics.record_written(&batch);
        }

        writer.flush()?;
        self.statistics.set_run_duration(started.elapsed());

        info!(summary = %self.statistics.summary(), "Simulation run complete");
        Ok(&self.statistics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::SimulationError;
    use crate::types::OutputFormat;

    #[test]
    fn test_trigger_claims_one_step_each() {
        let mut runner = SimulationRunner::new(SimulatorConfig { start_step: 10, ..Default::default() }).unwrap();
        let first = runner.trigger(None).unwrap();
        let second = runner.trigger(Some(AnomalyKind::TankLeak)).unwrap();

        assert_eq!(first.step_index, 10);
        assert_eq!(second.step_index, 11);
        assert_eq!(runner.step_counter().peek(), Some(12));
        assert_eq!(runner.statistics().batches_generated, 2);
        assert_eq!(runner.statistics().measurements_generated, 72);
        assert_eq!(runner.statistics().measurements_written, 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = SimulationRunner::new(SimulatorConfig { steps: 0, ..Default::default() });
        assert!(result.is_err());
    }

    #[test]
    fn test_run_applies_periodic_anomaly() {
        let config = SimulatorConfig {
            steps: 6,
            anomaly: Some("thermal_low".to_string()),
            anomaly_every: Some(3),
            ..Default::default()
        };
        let mut runner = SimulationRunner::new(config).unwrap();
        let mut writer = BatchWriter::new(Vec::new(), OutputFormat::Json);

        let stats = runner.run(&mut writer).unwrap();
        assert_eq!(stats.batches_generated, 6);
        // Steps 0 and 3
        assert_eq!(stats.anomaly_counts.get(&AnomalyKind::ThermalLow), Some(&6));
        assert_eq!(writer.batches_written(), 6);
    }

    #[test]
    fn test_trigger_stops_at_last_step_index() {
        let mut runner = SimulationRunner::new(SimulatorConfig { start_step: u64::MAX, steps: 1, ..Default::default() })
            .unwrap();

        assert_eq!(runner.trigger(None).unwrap().step_index, u64::MAX);
        let err = runner.trigger(None).unwrap_err();
        assert!(matches!(err, SimulationError::StepCounterError(_)));
        assert_eq!(runner.statistics().batches_generated, 1);
    }
}
