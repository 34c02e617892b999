//! Tool diagnostics
//!
//! Short, bounded invocations used before or outside a generation run: the
//! compiler version, whether the Python toolchain can be imported, which
//! Python packages are installed, and installing the toolchain with pip.
//! Every probe runs with a timeout; expiry counts as failure.

use crate::job::{Target, ToolCommand, TOOLCHAIN_MODULE};
use crate::plan::Invocation;
use crate::process::{CancelToken, ProcessRunner, SystemProcessRunner};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::time::Duration;
use tracing::{debug, info};

/// Timeout for version and import checks.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for installing the toolchain.
pub const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Package installed by [`Prober::install_toolchain`].
pub const TOOLCHAIN_PACKAGE: &str = "grpcio-tools";

/// Python packages reported by [`Prober::check_dependencies`], with the module
/// each one is imported as.
pub const PYTHON_DEPENDENCIES: &[(&str, &str)] = &[
    ("protobuf", "google.protobuf"),
    ("grpcio", "grpc"),
    ("grpcio-tools", "grpc_tools"),
];

/// Outcome of one probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub ok: bool,
    /// Version string, captured output or failure reason
    pub detail: String,
}

impl ProbeResult {
    fn ok(detail: impl Into<String>) -> Self {
        Self {
            ok: true,
            detail: detail.into(),
        }
    }

    fn failed(detail: impl Into<String>) -> Self {
        Self {
            ok: false,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyStatus {
    pub package: String,
    pub module: String,
    pub installed: bool,
}

/// Runs diagnostics through a [`ProcessRunner`].
pub struct Prober<P: ProcessRunner = SystemProcessRunner> {
    probe_runner: P,
    install_runner: P,
}

impl Prober<SystemProcessRunner> {
    pub fn new(probe_timeout: Duration, install_timeout: Duration) -> Self {
        Self {
            probe_runner: SystemProcessRunner::with_timeout(probe_timeout),
            install_runner: SystemProcessRunner::with_timeout(install_timeout),
        }
    }
}

impl Default for Prober<SystemProcessRunner> {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT, DEFAULT_INSTALL_TIMEOUT)
    }
}

impl<P: ProcessRunner> Prober<P> {
    pub fn with_runners(probe_runner: P, install_runner: P) -> Self {
        Self {
            probe_runner,
            install_runner,
        }
    }

    /// `<compiler> --version`
    pub fn compiler_version(&self, compiler: &ToolCommand) -> ProbeResult {
        let result = self.run(
            &self.probe_runner,
            invocation(compiler, Target::Java, &["--version"]),
        );
        if result.ok {
            info!(compiler = %compiler, version = %result.detail, "compiler available");
        }
        result
    }

    /// Whether the toolchain entry module can be imported by `python`.
    pub fn toolchain_available(&self, python: &str) -> ProbeResult {
        let script = format!("import {}; print('OK')", TOOLCHAIN_MODULE);
        self.run(
            &self.probe_runner,
            invocation(&ToolCommand::new(python), Target::Python, &["-c", &script]),
        )
    }

    /// One import probe per entry of [`PYTHON_DEPENDENCIES`].
    pub fn check_dependencies(&self, python: &str) -> Vec<DependencyStatus> {
        PYTHON_DEPENDENCIES
            .iter()
            .map(|(package, module)| {
                let script = format!("import {}; print('OK')", module);
                let result = self.run(
                    &self.probe_runner,
                    invocation(&ToolCommand::new(python), Target::Python, &["-c", &script]),
                );
                DependencyStatus {
                    package: package.to_string(),
                    module: module.to_string(),
                    installed: result.ok,
                }
            })
            .collect()
    }

    /// `<python> -m pip install grpcio-tools`
    pub fn install_toolchain(&self, python: &str) -> ProbeResult {
        info!(python = %python, package = TOOLCHAIN_PACKAGE, "installing toolchain");
        self.run(
            &self.install_runner,
            invocation(
                &ToolCommand::python_module(python, "pip"),
                Target::Python,
                &["install", TOOLCHAIN_PACKAGE],
            ),
        )
    }

    fn run(&self, runner: &P, invocation: Invocation) -> ProbeResult {
        debug!(program = %invocation.program, args = %invocation.display_args(), "probe");
        match runner.run(&invocation, &CancelToken::new()) {
            Ok(output) if output.succeeded() => ProbeResult::ok(first_line(&output.stdout)),
            Ok(output) => {
                let reason = if output.stderr.trim().is_empty() {
                    format!("exited with code {}", output.exit_code)
                } else {
                    output.stderr.trim().to_string()
                };
                ProbeResult::failed(reason)
            }
            Err(err) => ProbeResult::failed(err.to_string()),
        }
    }
}

fn invocation(command: &ToolCommand, target: Target, extra: &[&str]) -> Invocation {
    let mut args: Vec<OsString> = command.leading_args.iter().map(OsString::from).collect();
    args.extend(extra.iter().map(OsString::from));
    Invocation {
        target,
        program: command.program.clone(),
        args,
    }
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().trim().to_string()
}
