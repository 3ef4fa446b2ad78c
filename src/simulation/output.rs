//! Batch output
//!
//! JSON output is one batch per line (JSON Lines), the exact batch shape a
//! query layer ingests. CSV output is one row per measurement behind a single
//! header row.

use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
use tracing::trace;

use super::error::{SimulationError, SimulationResult};
use crate::telemetry::Batch;
use crate::types::OutputFormat;

/// Flat CSV rendering of one measurement
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    step_index: u64,
    timestamp_ms: i64,
    #[serde(rename = "site.id")]
    site_id: &'a str,
    #[serde(rename = "site.name")]
    site_name: &'a str,
    region: &'a str,
    #[serde(rename = "device.type")]
    device_type: &'a str,
    #[serde(rename = "device.id")]
    device_id: &'a str,
    name: &'static str,
    value: f64,
}

enum Sink<W: Write> {
    Json(W),
    Csv(csv::Writer<W>),
}

/// Writes batches to any byte sink in the configured format
pub struct BatchWriter<W: Write> {
    sink: Sink<W>,
    format: OutputFormat,
    batches_written: u64,
}

impl<W: Write> fmt::Debug for BatchWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchWriter")
            .field("format", &self.format)
            .field("batches_written", &self.batches_written)
            .finish()
    }
}

impl<W: Write> BatchWriter<W> {
    /// Wrap a sink
    pub fn new(inner: W, format: OutputFormat) -> Self {
        let sink = match format {
            OutputFormat::Json => Sink::Json(inner),
            OutputFormat::Csv => Sink::Csv(csv::Writer::from_writer(inner)),
        };
        Self { sink, format, batches_written: 0 }
    }

    /// Output format in use
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Number of batches written so far
    pub fn batches_written(&self) -> u64 {
        self.batches_written
    }

    /// Write one batch
    pub fn write_batch(&mut self, batch: &Batch) -> SimulationResult<()> {
        match &mut self.sink {
            Sink::Json(writer) => {
                let line = serde_json::to_string(batch)?;
                writeln!(writer, "{}", line)?;
            }
            Sink::Csv(writer) => {
                for m in &batch.measurements {
                    let row = CsvRow {
                        step_index: batch.step_index,
                        timestamp_ms: m.timestamp_ms,
                        site_id: &m.attributes.site_id,
                        site_name: &m.attributes.site_name,
                        region: &m.attributes.region,
                        device_type: &m.attributes.device_type,
                        device_id: &m.attributes.device_id,
                        name: m.name.as_str(),
                        value: m.value,
                    };
                    writer.serialize(row).map_err(io::Error::from)?;
                }
            }
        }

        self.batches_written += 1;
        trace!(step = batch.step_index, format = %self.format, "Batch written");
        Ok(())
    }

    /// Flush buffered output
    pub fn flush(&mut self) -> SimulationResult<()> {
        match &mut self.sink {
            Sink::Json(writer) => writer.flush()?,
            Sink::Csv(writer) => writer.flush()?,
        }
        Ok(())
    }

    /// Flush and hand back the underlying sink
    ///
    /// A CSV sink that fails its final flush surfaces as
    /// [`SimulationError::ExportError`].
    pub fn into_inner(self) -> SimulationResult<W> {
        match self.sink {
            Sink::Json(mut writer) => {
                writer.flush()?;
                Ok(writer)
            }
            Sink::Csv(writer) => writer.into_inner().map_err(|e| SimulationError::ExportError(e.to_string())),
        }
    }
}
