//! Error types for protobatch.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Job descriptor validation errors, raised before any process is spawned
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no input files")]
    NoInputFiles,

    #[error("no output directory")]
    NoOutputDirectory,

    #[error("no generation target selected")]
    NoTargetSelected,
}

/// Subprocess execution errors
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },

    #[error("process cancelled")]
    Cancelled,

    #[error("process I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-level errors for everything outside the batch worker
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid job: {0}")]
    Validation(#[from] ValidationError),

    #[error("Process error: {0}")]
    Process(#[from] ProcessError),

    #[error("A generation run is already in progress")]
    RunInProgress,

    #[error("Input not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Discovery failed: {0}")]
    DiscoveryFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Toolchain unavailable: {0}")]
    ToolchainUnavailable(String),

    #[error("Tool installation failed: {0}")]
    InstallFailed(String),

    #[error("Could not read confirmation: {0}")]
    PromptFailed(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
