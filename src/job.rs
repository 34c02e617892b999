//! Job Descriptor
//!
//! Immutable description of one generation run: which schema files, where the
//! output goes, which generators are enabled and which external commands to
//! invoke. Built and validated once by [`JobBuilder`] before a run starts.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default schema compiler, resolved through `PATH`.
pub const DEFAULT_COMPILER: &str = "protoc";

/// Default Python interpreter used to run the grpcio-tools toolchain.
#[cfg(windows)]
pub const DEFAULT_PYTHON: &str = "python";
#[cfg(not(windows))]
pub const DEFAULT_PYTHON: &str = "python3";

/// Entry module of the code-generation toolchain.
pub const TOOLCHAIN_MODULE: &str = "grpc_tools.protoc";

/// Generator kinds a job can enable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Java sources from the compiler's built-in generator
    Java,
    /// Python message modules from grpcio-tools
    Python,
    /// Python message modules plus gRPC service stubs from grpcio-tools
    PythonGrpc,
}

impl Target {
    pub fn as_str(self) -> &'static str {
        match self {
            Target::Java => "java",
            Target::Python => "python",
            Target::PythonGrpc => "python_grpc",
        }
    }

    /// Human-readable label used in log and failure messages.
    pub fn label(self) -> &'static str {
        match self {
            Target::Java => "Java",
            Target::Python => "Python",
            Target::PythonGrpc => "Python gRPC",
        }
    }

    /// Output subdirectory under the job's output root.
    pub fn output_subdir(self) -> &'static str {
        match self {
            Target::Java => "java",
            Target::Python | Target::PythonGrpc => "python",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An external command: program plus fixed leading arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default)]
    pub leading_args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// `<interpreter> -m <module>`
    pub fn python_module(interpreter: impl Into<String>, module: &str) -> Self {
        Self {
            program: interpreter.into(),
            leading_args: vec!["-m".to_string(), module.to_string()],
        }
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.leading_args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Validated, immutable description of a generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    schema_files: Vec<PathBuf>,
    output_root: PathBuf,
    targets: BTreeSet<Target>,
    compiler: ToolCommand,
    toolchain: ToolCommand,
    include_paths: Vec<PathBuf>,
}

impl JobDescriptor {
    pub fn builder() -> JobBuilder {
        JobBuilder::default()
    }

    pub fn schema_files(&self) -> &[PathBuf] {
        &self.schema_files
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn targets(&self) -> &BTreeSet<Target> {
        &self.targets
    }

    pub fn is_enabled(&self, target: Target) -> bool {
        self.targets.contains(&target)
    }

    pub fn compiler(&self) -> &ToolCommand {
        &self.compiler
    }

    pub fn toolchain(&self) -> &ToolCommand {
        &self.toolchain
    }

    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }
}

/// Collects raw user input and validates it into a [`JobDescriptor`].
///
/// Performs no filesystem or process I/O.
#[derive(Debug, Clone, Default)]
pub struct JobBuilder {
    schema_files: Vec<PathBuf>,
    output_root: String,
    targets: BTreeSet<Target>,
    compiler: Option<String>,
    python: Option<String>,
    include_paths: Vec<PathBuf>,
}

impl JobBuilder {
    pub fn schema_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_files.push(path.into());
        self
    }

    pub fn schema_files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.schema_files.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn output_root(mut self, dir: impl Into<String>) -> Self {
        self.output_root = dir.into();
        self
    }

    pub fn target(mut self, target: Target) -> Self {
        self.targets.insert(target);
        self
    }

    pub fn targets<I: IntoIterator<Item = Target>>(mut self, targets: I) -> Self {
        self.targets.extend(targets);
        self
    }

    /// Compiler program; blank falls back to [`DEFAULT_COMPILER`].
    pub fn compiler_path(mut self, program: impl Into<String>) -> Self {
        self.compiler = Some(program.into());
        self
    }

    /// Interpreter for the toolchain; blank falls back to [`DEFAULT_PYTHON`].
    pub fn python_interpreter(mut self, program: impl Into<String>) -> Self {
        self.python = Some(program.into());
        self
    }

    pub fn include_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.include_paths.push(path.into());
        self
    }

    pub fn include_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.include_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Result<JobDescriptor, ValidationError> {
        let schema_files = dedup_preserving_order(self.schema_files);
        if schema_files.is_empty() {
            return Err(ValidationError::NoInputFiles);
        }
        if self.output_root.trim().is_empty() {
            return Err(ValidationError::NoOutputDirectory);
        }
        if self.targets.is_empty() {
            return Err(ValidationError::NoTargetSelected);
        }

        let compiler = non_blank(self.compiler).unwrap_or_else(|| DEFAULT_COMPILER.to_string());
        let python = non_blank(self.python).unwrap_or_else(|| DEFAULT_PYTHON.to_string());

        Ok(JobDescriptor {
            schema_files,
            output_root: PathBuf::from(self.output_root),
            targets: self.targets,
            compiler: ToolCommand::new(compiler),
            toolchain: ToolCommand::python_module(python, TOOLCHAIN_MODULE),
            include_paths: dedup_preserving_order(self.include_paths),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Remove duplicates by exact path equality, keeping the first occurrence.
pub fn dedup_preserving_order(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = BTreeSet::new();
    paths
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
