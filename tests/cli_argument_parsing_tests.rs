//! Tests for CLI argument parsing and configuration loading
//!
//! These tests verify that command line arguments parse, that a JSON config
//! file is merged under CLI overrides, and that validation keeps the
//! permissive anomaly policy.

use clap::Parser;
use iot_telemetry_simulator::types::config::{CliArgs, ConfigError, ConfigValidationError, SimulatorConfig};
use iot_telemetry_simulator::types::{AnomalyKind, OutputFormat};
use std::io::Write;

fn config_file(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Test defaults when no arguments are given
#[test]
fn test_no_arguments_uses_defaults() {
    let args = CliArgs::try_parse_from(["test"]).unwrap();
    assert!(args.seed.is_none());
    assert!(!args.dry_run);

    let config = SimulatorConfig::from_cli_args(args).unwrap();
    assert_eq!(config, SimulatorConfig::default());
    assert_eq!(config.seed, 42);
    assert_eq!(config.steps, 10);
    assert_eq!(config.get_output_format(), Ok(OutputFormat::Json));
}

/// Test parsing of every generation flag
#[test]
fn test_generation_flags() {
    let args = CliArgs::try_parse_from([
        "test",
        "--seed",
        "-7",
        "--steps",
        "3",
        "--start-step",
        "100",
        "--anomaly",
        "tank_leak",
        "--anomaly-every",
        "2",
        "--output-format",
        "csv",
        "-o",
        "out.csv",
        "--interval-ms",
        "250",
    ])
    .unwrap();

    let config = SimulatorConfig::from_cli_args(args).unwrap();
    assert_eq!(config.seed, -7);
    assert_eq!(config.steps, 3);
    assert_eq!(config.start_step, 100);
    assert_eq!(config.anomaly_kind(), Some(AnomalyKind::TankLeak));
    assert_eq!(config.anomaly_every, Some(2));
    assert_eq!(config.get_output_format(), Ok(OutputFormat::Csv));
    assert_eq!(config.output_path.as_deref(), Some("out.csv"));
    assert_eq!(config.interval_ms, 250);
    assert_eq!(config.last_step(), 102);
    config.validate().unwrap();
}

/// Test the informational flags
#[test]
fn test_informational_flags() {
    let args =
        CliArgs::try_parse_from(["test", "--list-sites", "--list-metrics", "--print-config", "-v", "--json-logs"])
            .unwrap();
    assert!(args.list_sites);
    assert!(args.list_metrics);
    assert!(args.print_config);
    assert!(args.verbose);
    assert!(args.json_logs);
    assert!(!args.debug);
    assert!(args.log_dir.is_none());

    let args = CliArgs::try_parse_from(["test", "--log-dir", "logs", "-d"]).unwrap();
    assert_eq!(args.log_dir.as_deref(), Some("logs"));
    assert!(args.debug);
}

/// Test that non-numeric steps fail at parse time
#[test]
fn test_invalid_step_argument() {
    assert!(CliArgs::try_parse_from(["test", "--steps", "many"]).is_err());
    assert!(CliArgs::try_parse_from(["test", "--steps", "-1"]).is_err());
}

/// Test zero steps are caught by validation, not parsing
#[test]
fn test_zero_steps_fails_validation() {
    let args = CliArgs::try_parse_from(["test", "--steps", "0"]).unwrap();
    let config = SimulatorConfig::from_cli_args(args).unwrap();
    assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidStepCount(0))));
}

/// Test a start step near the end of the index space
#[test]
fn test_step_range_overflow_fails_validation() {
    let args = CliArgs::try_parse_from(["test", "--start-step", "18446744073709551615", "--steps", "2"]).unwrap();
    let config = SimulatorConfig::from_cli_args(args).unwrap();
    assert!(matches!(config.validate(), Err(ConfigValidationError::StepRangeOverflow { .. })));

    let args = CliArgs::try_parse_from(["test", "--start-step", "18446744073709551614", "--steps", "2"]).unwrap();
    let config = SimulatorConfig::from_cli_args(args).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.last_step(), u64::MAX);
}

/// Test validation of the remaining fields
#[test]
fn test_validation_rules() {
    let config = SimulatorConfig { anomaly_every: Some(0), ..Default::default() };
    assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidAnomalyPeriod)));

    let config = SimulatorConfig { output_format: "parquet".to_string(), ..Default::default() };
    assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidOutputFormat(_))));

    let config = SimulatorConfig { interval_ms: 3_600_001, ..Default::default() };
    assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidInterval { .. })));
}

/// Test unknown anomaly selectors pass validation and resolve to none
#[test]
fn test_unknown_anomaly_is_permissive() {
    let args = CliArgs::try_parse_from(["test", "--anomaly", "meltdown"]).unwrap();
    let config = SimulatorConfig::from_cli_args(args).unwrap();

    assert!(config.validate().is_ok());
    assert!(config.has_unrecognized_anomaly());
    assert_eq!(config.anomaly_kind(), None);
    assert_eq!(config.anomaly_for_step(0), None);
}

/// Test periodic anomaly scheduling
#[test]
fn test_anomaly_every() {
    let config = SimulatorConfig {
        anomaly: Some("pump_failure".to_string()),
        anomaly_every: Some(5),
        ..Default::default()
    };
    let applied: Vec<u64> = (0..12).filter(|step| config.anomaly_for_step(*step).is_some()).collect();
    assert_eq!(applied, vec![0, 5, 10]);
}

/// Test loading a config file and overriding it from the CLI
#[test]
fn test_config_file_with_cli_override() {
    let file = config_file(r#"{ "seed": 9, "steps": 4, "anomaly": "thermal_high", "output_format": "csv" }"#, ".json");
    let path = file.path().to_str().unwrap();

    let args = CliArgs::try_parse_from(["test", "--config", path, "--steps", "6"]).unwrap();
    let config = SimulatorConfig::from_cli_args(args).unwrap();

    assert_eq!(config.seed, 9);
    assert_eq!(config.steps, 6);
    assert_eq!(config.anomaly_kind(), Some(AnomalyKind::ThermalHigh));
    assert_eq!(config.output_format, "csv");
    assert_eq!(config.start_step, 0);
}

/// Test that unsupported and missing config files are rejected
#[test]
fn test_config_file_errors() {
    let toml = config_file("seed = 1", ".toml");
    assert!(matches!(SimulatorConfig::from_file(toml.path()), Err(ConfigError::UnsupportedFormat(_))));

    let broken = config_file("{ not json", ".json");
    assert!(matches!(SimulatorConfig::from_file(broken.path()), Err(ConfigError::JsonError(_))));

    assert!(matches!(
        SimulatorConfig::from_file("/nonexistent/sim.json"),
        Err(ConfigError::FileNotFound(_))
    ));
}

/// Test the printed template loads back unchanged
#[test]
fn test_saved_config_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sim.json");

    let original = SimulatorConfig {
        seed: 123,
        anomaly: Some("underdosing".to_string()),
        anomaly_every: Some(3),
        ..Default::default()
    };
    original.save_to_file(&path).unwrap();

    assert_eq!(SimulatorConfig::from_file(&path).unwrap(), original);
    assert!(original.print_json().unwrap().contains("\"seed\": 123"));
}
