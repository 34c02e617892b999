//! Configuration System
//!
//! Layered configuration for generation defaults, probe timeouts and logging.
//! Sources, lowest precedence first: built-in defaults, the global config file,
//! the workspace `protobatch.toml`, then `PROTOBATCH__SECTION__KEY` environment
//! variables. Command-line flags are applied on top by the CLI.

use crate::error::ApiError;
use crate::generation::FailurePolicy;
use crate::job::{Target, DEFAULT_COMPILER, DEFAULT_PYTHON};
use crate::logging::LoggingConfig;
use crate::probe::{DEFAULT_INSTALL_TIMEOUT, DEFAULT_PROBE_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Output directory, relative to the workspace, used when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "proto_output";

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProtobatchConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults for `protobatch generate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Schema compiler program or path
    #[serde(default = "default_compiler")]
    pub compiler: String,

    /// Python interpreter running grpcio-tools
    #[serde(default = "default_python")]
    pub python: String,

    /// Output root used when `--out` is not given
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Targets used when no target flag is given
    #[serde(default)]
    pub targets: Vec<Target>,

    /// Extra `--proto_path` directories
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,

    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

fn default_compiler() -> String {
    DEFAULT_COMPILER.to_string()
}

fn default_python() -> String {
    DEFAULT_PYTHON.to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            compiler: default_compiler(),
            python: default_python(),
            output_dir: None,
            targets: Vec::new(),
            include_paths: Vec::new(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// Timeouts for diagnostic invocations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_probe_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_install_timeout_secs")]
    pub install_timeout_secs: u64,
}

fn default_probe_timeout_secs() -> u64 {
    DEFAULT_PROBE_TIMEOUT.as_secs()
}

fn default_install_timeout_secs() -> u64 {
    DEFAULT_INSTALL_TIMEOUT.as_secs()
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_probe_timeout_secs(),
            install_timeout_secs: default_install_timeout_secs(),
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn install_timeout(&self) -> Duration {
        Duration::from_secs(self.install_timeout_secs)
    }
}

impl ProtobatchConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();

        if self.generator.compiler.trim().is_empty() {
            errors.push("generator.compiler cannot be empty");
        }
        if self.generator.python.trim().is_empty() {
            errors.push("generator.python cannot be empty");
        }
        if self.probe.timeout_secs == 0 {
            errors.push("probe.timeout_secs must be greater than zero");
        }
        if self.probe.install_timeout_secs == 0 {
            errors.push("probe.install_timeout_secs must be greater than zero");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            )))
        }
    }
}

// Serializes tests that read or write PROTOBATCH__* variables
#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
