//! Error types and handling
//!
//! Batch generation itself never fails; everything here belongs to the layers
//! around it: configuration, output, and the export trigger.

use thiserror::Error;

use crate::types::ConfigValidationError;

/// Errors that can occur while running the simulator
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration could not be loaded or failed validation
    #[error("Configuration validation failed: {0}")]
    ConfigurationError(String),

    /// Batch output could not be written
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Batch or statistics could not be serialized
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A step index could not be claimed
    #[error("Step counter error: {0}")]
    StepCounterError(String),

    /// Buffered output could not be handed back after the last batch
    #[error("Export failed: {0}")]
    ExportError(String),
}

impl From<ConfigValidationError> for SimulationError {
    fn from(error: ConfigValidationError) -> Self {
        SimulationError::ConfigurationError(error.to_string())
    }
}

impl SimulationError {
    /// Whether the run could continue past this error
    ///
    /// A recoverable error loses at most the batch being exported; the step it
    /// claimed is never re-triggered.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimulationError::ConfigurationError(_) => false,
            SimulationError::IoError(_) => true,
            SimulationError::SerializationError(_) => true,
            SimulationError::StepCounterError(_) => false,
            SimulationError::ExportError(_) => false,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            SimulationError::ConfigurationError(_) => "Configuration",
            SimulationError::IoError(_) => "IO",
            SimulationError::SerializationError(_) => "Serialization",
            SimulationError::StepCounterError(_) => "Step Counter",
            SimulationError::ExportError(_) => "Export",
        }
    }
}

/// Result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;
