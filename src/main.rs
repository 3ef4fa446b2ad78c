// IoT Telemetry Simulator - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/iot-telemetry-simulator --steps 5
// ```
//
// Or with an injected fault:
//
// ```console
// $ ./target/release/iot-telemetry-simulator --seed 7 --anomaly tank_leak --output-format csv -o out.csv
// ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use iot_telemetry_simulator::query::{FallbackQuery, FieldMapping, InMemoryMetricStore, MetricQuery};
use iot_telemetry_simulator::simulation::{
    BatchWriter, LoggingConfig, LoggingGuard, LoggingInitError, RunStatistics, SimulationRunner,
};
use iot_telemetry_simulator::telemetry::{generate_batch, metric_names, MetricName, SITES};
use iot_telemetry_simulator::types::{CliArgs, SimulatorConfig};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process;
use tracing::{error, info, Level};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    // Handle special CLI flags that don't require full initialization
    if args.print_config {
        match SimulatorConfig::default().print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    if args.list_sites {
        for site in &SITES {
            println!("{}\t{}\t{}", site.id, site.name, site.region);
        }
        return;
    }

    if args.list_metrics {
        for name in metric_names() {
            println!("{}", name);
        }
        return;
    }

    let _logging_guard = match init_logging(&args) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    info!("Starting IoT Telemetry Simulator");

    // Load configuration from CLI arguments and optional config file
    let config = match SimulatorConfig::from_cli_args(args.clone()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        eprintln!("Configuration validation failed: {}", e);
        process::exit(1);
    }

    info!("Configuration loaded and validated successfully");

    if args.dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - no batches will be written.");
        print_configuration_summary(&config);
        if let Err(e) = self_check(&config) {
            eprintln!("Self-check failed: {:#}", e);
            process::exit(1);
        }
        return;
    }

    print_startup_banner(&config);

    match run_simulation(config) {
        Ok(statistics) => {
            eprintln!("{}", statistics.generate_summary_output());
            info!("IoT Telemetry Simulator completed successfully");
        }
        Err(e) => {
            error!("Simulation failed: {:#}", e);
            eprintln!("Simulation failed: {:#}", e);
            process::exit(1);
        }
    }
}

/// Initialize logging based on CLI flags (warn by default)
fn init_logging(args: &CliArgs) -> std::result::Result<LoggingGuard, LoggingInitError> {
    if args.json_logs || args.log_dir.is_some() {
        let level = if args.debug {
            Level::DEBUG
        } else if args.verbose {
            Level::INFO
        } else {
            Level::WARN
        };

        let mut logging = LoggingConfig::new().with_level(level);
        if args.json_logs {
            logging = logging.with_json_format().without_ansi();
        }
        if let Some(dir) = &args.log_dir {
            logging = logging.with_file_logging(dir);
        }
        return logging.init();
    }

    if args.debug {
        LoggingConfig::init_debug()
    } else if args.verbose {
        LoggingConfig::init_verbose()
    } else {
        LoggingConfig::new().init()
    }
}

/// Run the configured number of steps, writing to stdout or the output file
fn run_simulation(config: SimulatorConfig) -> Result<RunStatistics> {
    let format = config
        .get_output_format()
        .map_err(anyhow::Error::msg)
        .context("Invalid output format")?;

    let sink: Box<dyn Write> = match &config.output_path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create output file '{}'", path))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut runner = SimulationRunner::new(config)?;
    let mut writer = BatchWriter::new(sink, format);
    runner.run(&mut writer)?;
    writer.into_inner()?.flush()?;

    Ok(runner.into_statistics())
}

/// Generate the first configured batch, store it under the primary convention,
/// and query it back through the fallback chain
fn self_check(config: &SimulatorConfig) -> Result<()> {
    let batch = generate_batch(config.seed, config.start_step, config.anomaly_for_step(config.start_step));

    let mapping = FieldMapping::candidates()
        .into_iter()
        .next()
        .context("No field mapping candidates")?;
    let mut store = InMemoryMetricStore::new();
    store.ingest_batch(&batch, &mapping);

    let outcome = FallbackQuery::new().run(&store, &MetricQuery::new(MetricName::DeviceStatus))?;
    let expected = SITES.len() * 3;
    if outcome.rows.len() != expected {
        bail!("expected {} device.status rows, found {}", expected, outcome.rows.len());
    }

    eprintln!(
        "Self-check: step {} produced {} measurements; {} device.status rows via '{}'",
        batch.step_index,
        batch.len(),
        outcome.rows.len(),
        outcome.mapping_label().unwrap_or("none")
    );
    Ok(())
}

/// Print startup banner and configuration summary
fn print_startup_banner(config: &SimulatorConfig) {
    eprintln!("IoT Telemetry Simulator");
    eprintln!("=======================");
    eprintln!("Deterministic chemical dosing, sanitation and water telemetry");
    eprintln!();

    print_configuration_summary(config);
}

/// Print configuration summary
fn print_configuration_summary(config: &SimulatorConfig) {
    eprintln!("Configuration:");
    eprintln!("  Seed: {}", config.seed);
    eprintln!("  Steps: {} ({} to {})", config.steps, config.start_step, config.last_step());
    match (&config.anomaly, config.anomaly_kind()) {
        (Some(_), Some(kind)) => match config.anomaly_every {
            Some(every) => eprintln!("  Anomaly: {} (every {} steps)", kind, every),
            None => eprintln!("  Anomaly: {} (every step)", kind),
        },
        (Some(selector), None) if config.has_unrecognized_anomaly() => {
            eprintln!("  Anomaly: '{}' not recognized, baseline only", selector)
        }
        _ => eprintln!("  Anomaly: none"),
    }
    eprintln!("  Output Format: {}", config.output_format);
    eprintln!("  Output: {}", config.output_path.as_deref().unwrap_or("stdout"));
    if config.interval_ms > 0 {
        eprintln!("  Interval: {} ms", config.interval_ms);
    }
    eprintln!();
}
