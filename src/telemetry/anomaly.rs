//! Anomaly effect table
//!
//! Each entry maps an (archetype, anomaly kind) pair to a pure transform over
//! the archetype's four value slots. Pairs without an entry leave the device at
//! its baseline. Transforms only perturb existing slots; they never add or
//! remove measurements.
//!
//! | Archetype          | underdosing              | pump_failure           | tank_leak               | thermal_high   | thermal_low    |
//! |--------------------|--------------------------|------------------------|-------------------------|----------------|----------------|
//! | ChemicalDosingPump | dosing x0.2, cond x0.3   | status 0, dosing 0     | level -(25..40), min 5  |                |                |
//! | Dishwasher         | sanitizer x0.25          | status 0, sanitizer 0  |                         | temp 85..95    | temp 35..40    |
//! | WaterSystem        |                          | status 0, flow 0       |                         |                |                |

use std::fmt;

use super::rng::Mulberry32;
use crate::types::{AnomalyKind, DeviceArchetype};

/// Values of one device, indexed by the archetype's metric slots
pub type SlotValues = [f64; 4];

/// A pure value transform; may draw from the batch's random source
pub type Transform = fn(&mut SlotValues, &mut Mulberry32);

/// Slot layout of a chemical dosing pump
pub mod pump_slots {
    /// `chemical.dosing_rate_lpm`
    pub const DOSING_RATE: usize = 0;
    /// `chemical.tank_level_pct`
    pub const TANK_LEVEL: usize = 1;
    /// `chemical.conductivity_uS`
    pub const CONDUCTIVITY: usize = 2;
    /// `device.status`
    pub const STATUS: usize = 3;
}

/// Slot layout of a sanitation/wash station
pub mod dishwasher_slots {
    /// `sanitation.cycle_count`
    pub const CYCLE_COUNT: usize = 0;
    /// `sanitation.water_temp_c`
    pub const WATER_TEMP: usize = 1;
    /// `sanitation.sanitizer_ppm`
    pub const SANITIZER: usize = 2;
    /// `device.status`
    pub const STATUS: usize = 3;
}

/// Slot layout of a water system
pub mod water_slots {
    /// `water.ph`
    pub const PH: usize = 0;
    /// `water.conductivity_uS`
    pub const CONDUCTIVITY: usize = 1;
    /// `water.flow_rate_lpm`
    pub const FLOW_RATE: usize = 2;
    /// `device.status`
    pub const STATUS: usize = 3;
}

/// Floor applied to a leaking tank's level
pub const TANK_LEAK_FLOOR_PCT: f64 = 5.0;

/// One row of the effect table
#[derive(Clone, Copy)]
pub struct AnomalyEffect {
    /// Archetype the effect applies to
    pub archetype: DeviceArchetype,
    /// Anomaly kind that triggers it
    pub kind: AnomalyKind,
    /// Value transform
    pub transform: Transform,
    /// Whether applying this effect appends the anomaly label to the batch
    pub records_label: bool,
}

impl fmt::Debug for AnomalyEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnomalyEffect")
            .field("archetype", &self.archetype)
            .field("kind", &self.kind)
            .field("records_label", &self.records_label)
            .finish()
    }
}

fn pump_underdosing(values: &mut SlotValues, _rng: &mut Mulberry32) {
    values[pump_slots::DOSING_RATE] *= 0.2;
    values[pump_slots::CONDUCTIVITY] *= 0.3;
}

fn pump_failure(values: &mut SlotValues, _rng: &mut Mulberry32) {
    values[pump_slots::STATUS] = 0.0;
    values[pump_slots::DOSING_RATE] = 0.0;
}

fn pump_tank_leak(values: &mut SlotValues, rng: &mut Mulberry32) {
    let drop = rng.next_in(25.0, 15.0);
    values[pump_slots::TANK_LEVEL] = (values[pump_slots::TANK_LEVEL] - drop).max(TANK_LEAK_FLOOR_PCT);
}

fn dishwasher_underdosing(values: &mut SlotValues, _rng: &mut Mulberry32) {
    values[dishwasher_slots::SANITIZER] *= 0.25;
}

fn dishwasher_failure(values: &mut SlotValues, _rng: &mut Mulberry32) {
    values[dishwasher_slots::STATUS] = 0.0;
    values[dishwasher_slots::SANITIZER] = 0.0;
}

fn dishwasher_thermal_high(values: &mut SlotValues, rng: &mut Mulberry32) {
    values[dishwasher_slots::WATER_TEMP] = rng.next_in(85.0, 10.0);
}

fn dishwasher_thermal_low(values: &mut SlotValues, rng: &mut Mulberry32) {
    values[dishwasher_slots::WATER_TEMP] = rng.next_in(35.0, 5.0);
}

fn water_failure(values: &mut SlotValues, _rng: &mut Mulberry32) {
    values[water_slots::STATUS] = 0.0;
    values[water_slots::FLOW_RATE] = 0.0;
}

/// The complete effect table
pub static EFFECTS: [AnomalyEffect; 8] = [
    AnomalyEffect {
        archetype: DeviceArchetype::ChemicalDosingPump,
        kind: AnomalyKind::Underdosing,
        transform: pump_underdosing,
        records_label: true,
    },
    AnomalyEffect {
        archetype: DeviceArchetype::ChemicalDosingPump,
        kind: AnomalyKind::PumpFailure,
        transform: pump_failure,
        records_label: true,
    },
    AnomalyEffect {
        archetype: DeviceArchetype::ChemicalDosingPump,
        kind: AnomalyKind::TankLeak,
        transform: pump_tank_leak,
        records_label: true,
    },
    AnomalyEffect {
        archetype: DeviceArchetype::Dishwasher,
        kind: AnomalyKind::Underdosing,
        transform: dishwasher_underdosing,
        records_label: false,
    },
    AnomalyEffect {
        archetype: DeviceArchetype::Dishwasher,
        kind: AnomalyKind::PumpFailure,
        transform: dishwasher_failure,
        records_label: false,
    },
    AnomalyEffect {
        archetype: DeviceArchetype::Dishwasher,
        kind: AnomalyKind::ThermalHigh,
        transform: dishwasher_thermal_high,
        records_label: true,
    },
    AnomalyEffect {
        archetype: DeviceArchetype::Dishwasher,
        kind: AnomalyKind::ThermalLow,
        transform: dishwasher_thermal_low,
        records_label: true,
    },
    AnomalyEffect {
        archetype: DeviceArchetype::WaterSystem,
        kind: AnomalyKind::PumpFailure,
        transform: water_failure,
        records_label: false,
    },
];

/// Effect for an (archetype, kind) pair, if any
pub fn effect_for(archetype: DeviceArchetype, kind: AnomalyKind) -> Option<&'static AnomalyEffect> {
    EFFECTS
        .iter()
        .find(|effect| effect.archetype == archetype && effect.kind == kind)
}

/// Archetypes whose values an anomaly kind perturbs
pub fn affected_archetypes(kind: AnomalyKind) -> Vec<DeviceArchetype> {
    EFFECTS
        .iter()
        .filter(|effect| effect.kind == kind)
        .map(|effect| effect.archetype)
        .collect()
}

/// Archetype whose devices record the anomaly label
pub fn recording_archetype(kind: AnomalyKind) -> Option<DeviceArchetype> {
    EFFECTS
        .iter()
        .find(|effect| effect.kind == kind && effect.records_label)
        .map(|effect| effect.archetype)
}
