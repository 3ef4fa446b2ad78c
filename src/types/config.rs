//! Configuration structures for the telemetry simulator
//!
//! This module contains the CLI surface, the optional JSON configuration file,
//! and the resolved simulator configuration with its validation rules.

use super::{AnomalyKind, OutputFormat};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Upper bound on the pause between two generated steps (one hour)
pub const MAX_INTERVAL_MS: u64 = 3_600_000;

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "iot-telemetry-simulator",
    version,
    about = "IoT Telemetry Simulator - Generates deterministic chemical dosing, sanitation and water telemetry",
    long_about = "Generates deterministic batches of telemetry for three sites (Hospital, Restaurant, FoodPlant) and three device archetypes, optionally perturbed by an injected fault.

EXAMPLES:
    # Ten batches with the default seed
    iot-telemetry-simulator

    # Reproduce a pump failure from step 100 onwards
    iot-telemetry-simulator --seed 7 --start-step 100 --steps 5 --anomaly pump_failure

    # Inject a thermal fault on every fourth step, write CSV to a file
    iot-telemetry-simulator --anomaly thermal_high --anomaly-every 4 --output-format csv --output out.csv

    # Generate configuration template
    iot-telemetry-simulator --print-config > sim.json

    # Validate configuration without running
    iot-telemetry-simulator --config sim.json --dry-run

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag, JSON)
    3. Default values (lowest priority)"
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Base seed for the deterministic random source
    #[arg(long, allow_negative_numbers = true, help = "Base seed for reproducible batches")]
    pub seed: Option<i64>,

    /// Number of batches to generate
    #[arg(
        long,
        help = "Number of steps (batches) to generate",
        long_help = "Number of steps to generate. Each step produces one batch of 36 measurements. Must be greater than 0. Default: 10"
    )]
    pub steps: Option<u64>,

    /// First step index
    #[arg(long, help = "Step index the counter starts from")]
    pub start_step: Option<u64>,

    /// Anomaly to inject
    #[arg(
        long,
        help = "Anomaly to inject (underdosing, pump_failure, tank_leak, thermal_high, thermal_low)",
        long_help = "Anomaly kind to inject. Unknown values are ignored with a warning and produce baseline batches."
    )]
    pub anomaly: Option<String>,

    /// Inject the anomaly only on steps divisible by this value
    #[arg(long, help = "Inject the anomaly only on every Nth step")]
    pub anomaly_every: Option<u64>,

    /// Output format for generated batches
    #[arg(
        long,
        help = "Output format (json or csv)",
        long_help = "Output format for generated batches. json writes one batch per line, csv writes one row per measurement. Default: json"
    )]
    pub output_format: Option<String>,

    /// Output file (stdout when omitted)
    #[arg(short, long, help = "Write batches to this file instead of stdout")]
    pub output: Option<String>,

    /// Pause between steps in milliseconds
    #[arg(long, help = "Pause between steps in milliseconds")]
    pub interval_ms: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Emit logs as JSON
    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    /// Directory for daily rolling JSON log files
    #[arg(long, help = "Also write JSON logs to daily rolling files in this directory")]
    pub log_dir: Option<String>,

    /// Dry run mode - validate configuration without running simulation
    #[arg(long, help = "Validate configuration without running simulation")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,

    /// Print the simulated site names and exit
    #[arg(long, help = "Print the simulated site names and exit")]
    pub list_sites: bool,

    /// Print the metric names and exit
    #[arg(long, help = "Print the metric names and exit")]
    pub list_metrics: bool,
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Base seed for the deterministic random source
    pub seed: Option<i64>,

    /// Number of batches to generate
    pub steps: Option<u64>,

    /// First step index
    pub start_step: Option<u64>,

    /// Anomaly selector
    pub anomaly: Option<String>,

    /// Inject the anomaly only on steps divisible by this value
    pub anomaly_every: Option<u64>,

    /// Output format for generated batches
    pub output_format: Option<String>,

    /// Output file
    pub output_path: Option<String>,

    /// Pause between steps in milliseconds
    pub interval_ms: Option<u64>,
}

/// Resolved configuration for a simulator run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Base seed for the deterministic random source
    pub seed: i64,

    /// Number of batches to generate
    pub steps: u64,

    /// First step index
    pub start_step: u64,

    /// Anomaly selector as given; parsed permissively
    pub anomaly: Option<String>,

    /// Inject the anomaly only on steps divisible by this value
    pub anomaly_every: Option<u64>,

    /// Output format for generated batches
    pub output_format: String,

    /// Output file (stdout when `None`)
    pub output_path: Option<String>,

    /// Pause between steps in milliseconds
    pub interval_ms: u64,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Validation errors for simulator configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// Step count is invalid
    #[error("Step count must be greater than 0, got {0}")]
    InvalidStepCount(u64),

    /// The requested steps run past the last representable step index
    #[error("{steps} steps starting at {start} run past the last step index")]
    StepRangeOverflow {
        /// First step index
        start: u64,
        /// Number of steps requested
        steps: u64,
    },

    /// Anomaly period is invalid
    #[error("Anomaly period must be greater than 0")]
    InvalidAnomalyPeriod,

    /// Output format is not supported
    #[error("Unknown output format: {0} (supported: json, csv)")]
    InvalidOutputFormat(String),

    /// Interval between steps is too long
    #[error("Interval must be at most {max} ms, got {value}")]
    InvalidInterval {
        /// The rejected interval
        value: u64,
        /// The accepted maximum
        max: u64,
    },
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            steps: 10,
            start_step: 0,
            anomaly: None,
            anomaly_every: None,
            output_format: "json".to_string(),
            output_path: None,
            interval_ms: 0,
        }
    }
}

impl SimulatorConfig {
    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // CLI takes precedence over the file
        Self::apply_cli_overrides(&mut config, args);

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let content = fs::read_to_string(path)?;
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Create configuration from a config file, merging with defaults
    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            seed: config_file.seed.unwrap_or(defaults.seed),
            steps: config_file.steps.unwrap_or(defaults.steps),
            start_step: config_file.start_step.unwrap_or(defaults.start_step),
            anomaly: config_file.anomaly.or(defaults.anomaly),
            anomaly_every: config_file.anomaly_every.or(defaults.anomaly_every),
            output_format: config_file.output_format.unwrap_or(defaults.output_format),
            output_path: config_file.output_path.or(defaults.output_path),
            interval_ms: config_file.interval_ms.unwrap_or(defaults.interval_ms),
        }
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: CliArgs) {
        if let Some(value) = args.seed {
            config.seed = value;
        }
        if let Some(value) = args.steps {
            config.steps = value;
        }
        if let Some(value) = args.start_step {
            config.start_step = value;
        }
        if let Some(value) = args.anomaly {
            config.anomaly = Some(value);
        }
        if let Some(value) = args.anomaly_every {
            config.anomaly_every = Some(value);
        }
        if let Some(value) = args.output_format {
            config.output_format = value;
        }
        if let Some(value) = args.output {
            config.output_path = Some(value);
        }
        if let Some(value) = args.interval_ms {
            config.interval_ms = value;
        }
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration parameters
    ///
    /// The anomaly selector is deliberately not validated: unknown selectors
    /// degrade to baseline batches.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.steps == 0 {
            return Err(ConfigValidationError::InvalidStepCount(self.steps));
        }

        if self.start_step.checked_add(self.steps - 1).is_none() {
            return Err(ConfigValidationError::StepRangeOverflow { start: self.start_step, steps: self.steps });
        }

        if self.anomaly_every == Some(0) {
            return Err(ConfigValidationError::InvalidAnomalyPeriod);
        }

        if self.get_output_format().is_err() {
            return Err(ConfigValidationError::InvalidOutputFormat(self.output_format.clone()));
        }

        if self.interval_ms > MAX_INTERVAL_MS {
            return Err(ConfigValidationError::InvalidInterval {
                value: self.interval_ms,
                max: MAX_INTERVAL_MS,
            });
        }

        Ok(())
    }

    /// Get the output format as an enum value
    pub fn get_output_format(&self) -> Result<OutputFormat, String> {
        self.output_format.parse()
    }

    /// Resolve the anomaly selector; unknown selectors resolve to `None`
    pub fn anomaly_kind(&self) -> Option<AnomalyKind> {
        self.anomaly.as_deref().and_then(AnomalyKind::from_selector)
    }

    /// True when a selector was given but does not name a known anomaly
    pub fn has_unrecognized_anomaly(&self) -> bool {
        match self.anomaly.as_deref() {
            Some(selector) => {
                let trimmed = selector.trim();
                !trimmed.is_empty()
                    && !trimmed.eq_ignore_ascii_case("none")
                    && AnomalyKind::from_selector(trimmed).is_none()
            }
            None => false,
        }
    }

    /// Whether the configured anomaly applies to the given step
    pub fn anomaly_for_step(&self, step_index: u64) -> Option<AnomalyKind> {
        let kind = self.anomaly_kind()?;
        match self.anomaly_every {
            Some(every) if every > 0 && step_index % every != 0 => None,
            _ => Some(kind),
        }
    }

    /// Last step index this configuration will generate
    pub fn last_step(&self) -> u64 {
        self.start_step.saturating_add(self.steps.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulatorConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.steps, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_steps_rejected() {
        let config = SimulatorConfig { steps: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidStepCount(0))));
    }

    #[test]
    fn test_zero_anomaly_period_rejected() {
        let config = SimulatorConfig { anomaly_every: Some(0), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidAnomalyPeriod)));
    }

    #[test]
    fn test_unknown_output_format_rejected() {
        let config = SimulatorConfig { output_format: "parquet".to_string(), ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidOutputFormat(_))
        ));
    }

    #[test]
    fn test_interval_upper_bound() {
        let config = SimulatorConfig { interval_ms: MAX_INTERVAL_MS + 1, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidInterval { .. })));
    }

    #[test]
    fn test_unknown_anomaly_is_not_a_validation_error() {
        let config = SimulatorConfig { anomaly: Some("meltdown".to_string()), ..Default::default() };
        assert!(config.validate().is_ok());
        assert_eq!(config.anomaly_kind(), None);
        assert!(config.has_unrecognized_anomaly());
    }

    #[test]
    fn test_anomaly_schedule() {
        let config = SimulatorConfig {
            anomaly: Some("tank_leak".to_string()),
            anomaly_every: Some(3),
            ..Default::default()
        };
        assert_eq!(config.anomaly_for_step(0), Some(AnomalyKind::TankLeak));
        assert_eq!(config.anomaly_for_step(1), None);
        assert_eq!(config.anomaly_for_step(6), Some(AnomalyKind::TankLeak));

        let every_step = SimulatorConfig { anomaly_every: None, ..config };
        assert_eq!(every_step.anomaly_for_step(1), Some(AnomalyKind::TankLeak));
    }

    #[test]
    fn test_step_range_must_fit_u64() {
        let config = SimulatorConfig { start_step: u64::MAX, steps: 2, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::StepRangeOverflow { start: u64::MAX, steps: 2 })
        ));

        let last_only = SimulatorConfig { start_step: u64::MAX, steps: 1, ..Default::default() };
        assert!(last_only.validate().is_ok());
        assert_eq!(last_only.last_step(), u64::MAX);
    }

    #[test]
    fn test_last_step() {
        let config = SimulatorConfig { start_step: 5, steps: 3, ..Default::default() };
        assert_eq!(config.last_step(), 7);
    }
}
