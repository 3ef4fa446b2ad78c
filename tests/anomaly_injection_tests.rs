//! Tests for anomaly injection
//!
//! These tests pin the concrete fault scenarios: underdosing lowers dosing,
//! pump failure zeroes status, tank leak drains tanks, thermal faults move
//! wash temperatures, and each supported kind labels one device per site.

use iot_telemetry_simulator::telemetry::{affected_archetypes, generate_batch_at, recording_archetype, MetricName};
use iot_telemetry_simulator::types::{AnomalyKind, DeviceArchetype};

const T0: i64 = 1_700_000_000_000;

#[test]
fn test_underdosing_lowers_mean_dosing_rate() {
    let baseline = generate_batch_at(99, 0, None, T0);
    let degraded = generate_batch_at(99, 0, Some(AnomalyKind::Underdosing), T0);

    let before = baseline.mean_of(MetricName::ChemicalDosingRate).unwrap();
    let after = degraded.mean_of(MetricName::ChemicalDosingRate).unwrap();
    assert!(after < before, "{} should be below {}", after, before);
}

#[test]
fn test_underdosing_scales_sanitizer() {
    let baseline = generate_batch_at(5, 3, None, T0);
    let degraded = generate_batch_at(5, 3, Some(AnomalyKind::Underdosing), T0);

    let before = baseline.values_of(MetricName::SanitationSanitizer);
    let after = degraded.values_of(MetricName::SanitationSanitizer);
    for (b, a) in before.iter().zip(&after) {
        assert_eq!(*a, b * 0.25);
    }
}

#[test]
fn test_pump_failure_forces_status_zero() {
    let batch = generate_batch_at(1, 0, Some(AnomalyKind::PumpFailure), T0);
    let readings = batch.device_readings();

    let failed: Vec<_> = readings
        .iter()
        .filter(|(_, metrics)| metrics.get(&MetricName::DeviceStatus) == Some(&0.0))
        .collect();
    assert!(!failed.is_empty());

    for (device_id, metrics) in failed {
        if let Some(dosing) = metrics.get(&MetricName::ChemicalDosingRate) {
            assert_eq!(*dosing, 0.0, "{} reports dosing with zero status", device_id);
        }
    }
}

#[test]
fn test_pump_failure_reaches_every_device() {
    let batch = generate_batch_at(1, 0, Some(AnomalyKind::PumpFailure), T0);
    assert!(batch.values_of(MetricName::DeviceStatus).iter().all(|v| *v == 0.0));
    assert!(batch.values_of(MetricName::SanitationSanitizer).iter().all(|v| *v == 0.0));
    assert!(batch.values_of(MetricName::WaterFlowRate).iter().all(|v| *v == 0.0));
}

#[test]
fn test_tank_leak_reduces_level() {
    let baseline = generate_batch_at(77, 0, None, T0);
    let leaking = generate_batch_at(77, 0, Some(AnomalyKind::TankLeak), T0);

    let before = baseline.mean_of(MetricName::ChemicalTankLevel).unwrap();
    let after = leaking.mean_of(MetricName::ChemicalTankLevel).unwrap();
    assert!(after < before);
    assert!(leaking.values_of(MetricName::ChemicalTankLevel).iter().all(|v| *v >= 5.0));
}

#[test]
fn test_tank_leak_never_below_floor() {
    for seed in 0..300 {
        let batch = generate_batch_at(seed, seed as u64, Some(AnomalyKind::TankLeak), T0);
        for level in batch.values_of(MetricName::ChemicalTankLevel) {
            assert!((5.0..=70.0).contains(&level), "seed {} level {}", seed, level);
        }
    }
}

#[test]
fn test_thermal_faults_move_wash_temperature() {
    for seed in 0..100 {
        let hot = generate_batch_at(seed, 1, Some(AnomalyKind::ThermalHigh), T0);
        assert!(hot.values_of(MetricName::SanitationWaterTemp).iter().all(|t| (85.0..95.0).contains(t)));

        let cold = generate_batch_at(seed, 1, Some(AnomalyKind::ThermalLow), T0);
        assert!(cold.values_of(MetricName::SanitationWaterTemp).iter().all(|t| (35.0..40.0).contains(t)));
    }
}

#[test]
fn test_water_system_only_responds_to_pump_failure() {
    for kind in [AnomalyKind::Underdosing, AnomalyKind::TankLeak, AnomalyKind::ThermalHigh, AnomalyKind::ThermalLow] {
        assert!(!affected_archetypes(kind).contains(&DeviceArchetype::WaterSystem));
    }

    // Underdosing draws nothing, so every water reading is untouched
    let baseline = generate_batch_at(21, 2, None, T0);
    let perturbed = generate_batch_at(21, 2, Some(AnomalyKind::Underdosing), T0);
    for metric in [MetricName::WaterPh, MetricName::WaterConductivity, MetricName::WaterFlowRate] {
        assert_eq!(baseline.values_of(metric), perturbed.values_of(metric));
    }
}

#[test]
fn test_anomaly_list_cardinality() {
    for kind in AnomalyKind::ALL {
        let batch = generate_batch_at(4, 9, Some(kind), T0);
        assert_eq!(batch.anomalies_injected.len(), 3, "{}", kind);
        assert!(batch.anomalies_injected.iter().all(|k| *k == kind));
        assert!(recording_archetype(kind).is_some());
    }

    let baseline = generate_batch_at(4, 9, None, T0);
    assert!(baseline.anomalies_injected.is_empty());
}
