//! Metric batch generator
//!
//! A batch is a pure function of `(seed, step_index, anomaly)`; only the capture
//! timestamp comes from the wall clock, sampled once and stamped on every
//! measurement. Devices are visited site-major, archetype-minor. Per device the
//! random source is drawn in a fixed order: device index, the archetype's
//! baseline slots, then any anomaly draws.

use chrono::Utc;

use super::anomaly::{effect_for, SlotValues};
use super::measurement::{Batch, Measurement, MeasurementAttributes};
use super::metric::archetype_metrics;
use super::rng::Mulberry32;
use super::site::SITES;
use crate::types::{AnomalyKind, DeviceArchetype, DeviceId};

/// Measurements emitted by one device
pub const MEASUREMENTS_PER_DEVICE: usize = 4;

/// Measurements in every batch (3 sites x 3 archetypes x 4)
pub const MEASUREMENTS_PER_BATCH: usize = SITES.len() * DeviceArchetype::ALL.len() * MEASUREMENTS_PER_DEVICE;

const DEVICE_INDEX_RANGE: f64 = 3.0;

/// How a slot's baseline value is produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Baseline {
    /// `base + random() * range`
    Linear {
        /// Lower bound
        base: f64,
        /// Width of the range
        range: f64,
    },
    /// `floor(step_index * per_step + random() * jitter)`, grows with the step
    Cumulative {
        /// Increase per step
        per_step: f64,
        /// Random spread added on top
        jitter: f64,
    },
    /// Fixed value, no draw
    Constant(f64),
}

impl Baseline {
    fn sample(self, step_index: u64, rng: &mut Mulberry32) -> f64 {
        match self {
            Baseline::Linear { base, range } => rng.next_in(base, range),
            Baseline::Cumulative { per_step, jitter } => {
                (step_index as f64 * per_step + rng.next_f64() * jitter).floor()
            }
            Baseline::Constant(value) => value,
        }
    }
}

/// Baseline formulas per archetype, in slot order
pub fn archetype_baselines(archetype: DeviceArchetype) -> [Baseline; 4] {
    const STATUS_OK: Baseline = Baseline::Constant(1.0);

    match archetype {
        DeviceArchetype::ChemicalDosingPump => [
            Baseline::Linear { base: 0.8, range: 0.4 },
            Baseline::Linear { base: 70.0, range: 25.0 },
            Baseline::Linear { base: 1200.0, range: 400.0 },
            STATUS_OK,
        ],
        DeviceArchetype::Dishwasher => [
            Baseline::Cumulative { per_step: 2.0, jitter: 3.0 },
            Baseline::Linear { base: 55.0, range: 15.0 },
            Baseline::Linear { base: 45.0, range: 25.0 },
            STATUS_OK,
        ],
        DeviceArchetype::WaterSystem => [
            Baseline::Linear { base: 6.6, range: 0.8 },
            Baseline::Linear { base: 800.0, range: 300.0 },
            Baseline::Linear { base: 12.0, range: 8.0 },
            STATUS_OK,
        ],
    }
}

fn baseline_values(archetype: DeviceArchetype, step_index: u64, rng: &mut Mulberry32) -> SlotValues {
    let mut values = [0.0; MEASUREMENTS_PER_DEVICE];
    for (slot, baseline) in values.iter_mut().zip(archetype_baselines(archetype)) {
        *slot = baseline.sample(step_index, rng);
    }
    values
}

/// Generate one batch, stamping it with the current time
pub fn generate_batch(seed: i64, step_index: u64, inject_anomaly: Option<AnomalyKind>) -> Batch {
    generate_batch_at(seed, step_index, inject_anomaly, Utc::now().timestamp_millis())
}

/// Generate one batch with an explicit capture timestamp
pub fn generate_batch_at(
    seed: i64,
    step_index: u64,
    inject_anomaly: Option<AnomalyKind>,
    timestamp_ms: i64,
) -> Batch {
    let mut rng = Mulberry32::for_step(seed, step_index);
    let mut measurements = Vec::with_capacity(MEASUREMENTS_PER_BATCH);
    let mut anomalies_injected = Vec::new();

    for site in &SITES {
        for archetype in DeviceArchetype::ALL {
            let index = 1 + (rng.next_f64() * DEVICE_INDEX_RANGE).floor() as u8;
            let device_id = DeviceId::derive(site.id, archetype, index);

            let mut values = baseline_values(archetype, step_index, &mut rng);
            if let Some(effect) = inject_anomaly.and_then(|kind| effect_for(archetype, kind)) {
                (effect.transform)(&mut values, &mut rng);
                if effect.records_label {
                    anomalies_injected.push(effect.kind);
                }
            }

            let attributes = MeasurementAttributes {
                site_id: site.id.to_string(),
                site_name: site.name.to_string(),
                region: site.region.as_str().to_string(),
                device_type: archetype.as_str().to_string(),
                device_id: device_id.into(),
            };

            for (name, value) in archetype_metrics(archetype).into_iter().zip(values) {
                measurements.push(Measurement {
                    name,
                    value,
                    timestamp_ms,
                    attributes: attributes.clone(),
                });
            }
        }
    }

    Batch { measurements, step_index, anomalies_injected }
}

/// Generate one batch from a raw anomaly selector
///
/// Unknown selectors produce the baseline batch.
pub fn generate_batch_from_selector(seed: i64, step_index: u64, selector: Option<&str>) -> Batch {
    generate_batch(seed, step_index, selector.and_then(AnomalyKind::from_selector))
}
