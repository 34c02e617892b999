//! Invocation planning: include-path composition, script target selection and
//! argument vectors for the compiler and the toolchain.

use crate::job::{JobDescriptor, Target, ToolCommand};
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Include path used when a file has no containing directory and the job has
/// no include paths.
pub const FALLBACK_INCLUDE: &str = ".";

/// A fully composed subprocess invocation (argument vector, no shell).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub target: Target,
    pub program: String,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn display_args(&self) -> String {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How the script-language targets of a job map onto toolchain invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptPlan {
    /// No script target enabled
    Skip,
    /// `--python_out` only
    Basic,
    /// `--python_out` and `--grpc_python_out` in one process
    WithRpc,
}

impl ScriptPlan {
    /// RPC generation supersedes the basic output, so at most one toolchain
    /// process is planned per file.
    pub fn for_targets(targets: &BTreeSet<Target>) -> Self {
        if targets.contains(&Target::PythonGrpc) {
            ScriptPlan::WithRpc
        } else if targets.contains(&Target::Python) {
            ScriptPlan::Basic
        } else {
            ScriptPlan::Skip
        }
    }

    pub fn target(self) -> Option<Target> {
        match self {
            ScriptPlan::Skip => None,
            ScriptPlan::Basic => Some(Target::Python),
            ScriptPlan::WithRpc => Some(Target::PythonGrpc),
        }
    }
}

/// Include directories for one schema file: its containing directory, then the
/// job's include paths. Never empty.
pub fn include_dirs(schema_file: &Path, include_paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut dirs = Vec::with_capacity(include_paths.len() + 1);
    if let Some(parent) = schema_file.parent() {
        if !parent.as_os_str().is_empty() {
            dirs.push(parent.to_path_buf());
        }
    }
    dirs.extend(include_paths.iter().cloned());
    if dirs.is_empty() {
        dirs.push(PathBuf::from(FALLBACK_INCLUDE));
    }
    dirs
}

/// `--proto_path=<dir>` arguments for [`include_dirs`].
pub fn include_args(schema_file: &Path, include_paths: &[PathBuf]) -> Vec<OsString> {
    include_dirs(schema_file, include_paths)
        .iter()
        .map(|dir| flag_with_path("--proto_path=", dir))
        .collect()
}

/// Output directory for a target under the job's output root.
pub fn output_dir(job: &JobDescriptor, target: Target) -> PathBuf {
    job.output_root().join(target.output_subdir())
}

/// `<compiler> --java_out=<dir> --proto_path=... <file>`
pub fn native_invocation(job: &JobDescriptor, schema_file: &Path) -> Invocation {
    let out = output_dir(job, Target::Java);
    let mut args = vec![flag_with_path("--java_out=", &out)];
    args.extend(include_args(schema_file, job.include_paths()));
    args.push(schema_file.as_os_str().to_os_string());
    with_command(job.compiler(), Target::Java, args)
}

/// Toolchain invocation for the job's script plan, if any script target is enabled.
pub fn script_invocation(job: &JobDescriptor, schema_file: &Path) -> Option<Invocation> {
    let plan = ScriptPlan::for_targets(job.targets());
    let target = plan.target()?;
    let out = output_dir(job, target);

    let mut args = vec![flag_with_path("--python_out=", &out)];
    if plan == ScriptPlan::WithRpc {
        args.push(flag_with_path("--grpc_python_out=", &out));
    }
    args.extend(include_args(schema_file, job.include_paths()));
    args.push(schema_file.as_os_str().to_os_string());
    Some(with_command(job.toolchain(), target, args))
}

/// Every invocation for one file, in execution order.
pub fn file_invocations(job: &JobDescriptor, schema_file: &Path) -> Vec<Invocation> {
    let mut invocations = Vec::new();
    if job.is_enabled(Target::Java) {
        invocations.push(native_invocation(job, schema_file));
    }
    if let Some(script) = script_invocation(job, schema_file) {
        invocations.push(script);
    }
    invocations
}

fn with_command(command: &ToolCommand, target: Target, args: Vec<OsString>) -> Invocation {
    let mut full = Vec::with_capacity(command.leading_args.len() + args.len());
    full.extend(command.leading_args.iter().map(OsString::from));
    full.extend(args);
    Invocation {
        target,
        program: command.program.clone(),
        args: full,
    }
}

fn flag_with_path(flag: &str, path: &Path) -> OsString {
    let mut arg = OsString::from(flag);
    arg.push(path.as_os_str());
    arg
}
