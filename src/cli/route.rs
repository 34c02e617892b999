//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::help::command_name;
use crate::cli::parse::{Commands, GenerateArgs};
use crate::cli::presentation::{
    format_check_report_json, format_check_report_text, format_discovered_files,
    format_event_json, format_event_line, format_generated_files, format_log_line,
    list_generated_files, CheckReport,
};
use crate::config::{ConfigLoader, ProtobatchConfig, DEFAULT_OUTPUT_DIR};
use crate::discovery::{discover_schema_files, expand_inputs};
use crate::error::ApiError;
use crate::generation::{BatchRunner, FailurePolicy, RunEvent};
use crate::job::{JobDescriptor, Target, ToolCommand};
use crate::probe::{Prober, TOOLCHAIN_PACKAGE};
use chrono::Local;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Runtime context for CLI execution: workspace and loaded configuration.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config: ProtobatchConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        config.validate()?;
        Ok(Self {
            workspace_root,
            config,
        })
    }

    /// Execute a CLI command via the single route table.
    ///
    /// `generate` streams run events to stdout as they arrive; the returned
    /// string is printed after the command finishes.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        info!(
            command = command_name(command),
            workspace = %self.workspace_root.display(),
            "executing command"
        );
        match command {
            Commands::Generate(args) => self.handle_generate(args),
            Commands::Check {
                protoc,
                python_exe,
                format,
            } => self.handle_check(protoc.as_deref(), python_exe.as_deref(), format),
            Commands::InstallTools { python_exe, yes } => {
                self.handle_install_tools(python_exe.as_deref(), *yes)
            }
            Commands::Discover { dir, format } => self.handle_discover(dir, format),
        }
    }

    /// Merge command-line flags over configuration into a job descriptor.
    ///
    /// Without `--out` or `generator.output_dir`, output goes to
    /// `<workspace>/proto_output`.
    pub fn build_job(&self, args: &GenerateArgs) -> Result<JobDescriptor, ApiError> {
        let generator = &self.config.generator;
        let files = expand_inputs(&args.inputs)?;

        let output_root = args
            .out
            .clone()
            .or_else(|| generator.output_dir.clone())
            .unwrap_or_else(|| self.workspace_root.join(DEFAULT_OUTPUT_DIR));

        let mut targets = Vec::new();
        if args.java {
            targets.push(Target::Java);
        }
        if args.python {
            targets.push(Target::Python);
        }
        if args.grpc {
            targets.push(Target::PythonGrpc);
        }
        if targets.is_empty() {
            targets = generator.targets.clone();
        }

        let job = JobDescriptor::builder()
            .schema_files(files)
            .output_root(output_root.to_string_lossy())
            .targets(targets)
            .compiler_path(args.protoc.clone().unwrap_or_else(|| generator.compiler.clone()))
            .python_interpreter(
                args.python_exe
                    .clone()
                    .unwrap_or_else(|| generator.python.clone()),
            )
            .include_paths(generator.include_paths.iter().cloned())
            .include_paths(args.include.iter().cloned())
            .build()?;
        Ok(job)
    }

    fn failure_policy(&self, args: &GenerateArgs) -> FailurePolicy {
        if args.continue_on_failure {
            FailurePolicy::ContinueOnFailure
        } else {
            self.config.generator.failure_policy
        }
    }

    fn prober(&self) -> Prober {
        Prober::new(
            self.config.probe.timeout(),
            self.config.probe.install_timeout(),
        )
    }

    fn handle_generate(&self, args: &GenerateArgs) -> Result<String, ApiError> {
        let job = self.build_job(args)?;
        let json = args.format == "json";

        if job.is_enabled(Target::PythonGrpc) && !args.skip_preflight {
            self.ensure_toolchain(job.toolchain(), args.yes, json)?;
        }

        let runner = BatchRunner::new().with_failure_policy(self.failure_policy(args));
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        if !json {
            writeln!(
                out,
                "{}",
                format_log_line(
                    Local::now().time(),
                    &format!("Starting generation of {} files", job.schema_files().len())
                )
            )?;
        }

        let mut handle = runner.start(job.clone())?;
        let mut terminal = None;
        while let Some(event) = handle.recv() {
            if json {
                writeln!(out, "{}", format_event_json(&event)?)?;
            } else {
                writeln!(out, "{}", format_event_line(Local::now().time(), &event))?;
            }
            if let RunEvent::Terminal(update) = event {
                terminal = Some(update);
            }
        }
        handle.join();
        drop(out);

        let update = terminal.ok_or_else(|| {
            ApiError::GenerationFailed("run ended without a result".to_string())
        })?;
        if !update.success {
            return Err(ApiError::GenerationFailed(update.message));
        }
        if json {
            return Ok(String::new());
        }
        let files = list_generated_files(job.output_root())?;
        Ok(format_generated_files(job.output_root(), &files))
    }

    /// Check that the gRPC toolchain imports; offer to install it when not.
    fn ensure_toolchain(
        &self,
        toolchain: &ToolCommand,
        yes: bool,
        json: bool,
    ) -> Result<(), ApiError> {
        let prober = self.prober();
        let python = toolchain.program.as_str();
        let status = prober.toolchain_available(python);
        if status.ok {
            return Ok(());
        }
        warn!(python = %python, detail = %status.detail, "gRPC toolchain not available");

        let prompt = format!(
            "{} is not installed for {}. Install it now?",
            TOOLCHAIN_PACKAGE, python
        );
        if !yes && !confirm(&prompt)? {
            return Err(ApiError::ToolchainUnavailable(format!(
                "{} is required for gRPC generation ({})",
                TOOLCHAIN_PACKAGE, status.detail
            )));
        }

        if !json {
            println!(
                "{}",
                format_log_line(
                    Local::now().time(),
                    &format!("Installing {}...", TOOLCHAIN_PACKAGE)
                )
            );
        }
        let installed = prober.install_toolchain(python);
        if !installed.ok {
            return Err(ApiError::InstallFailed(installed.detail));
        }
        let recheck = prober.toolchain_available(python);
        if !recheck.ok {
            return Err(ApiError::ToolchainUnavailable(recheck.detail));
        }
        Ok(())
    }

    fn handle_check(
        &self,
        protoc: Option<&str>,
        python: Option<&str>,
        format: &str,
    ) -> Result<String, ApiError> {
        let generator = &self.config.generator;
        let compiler = protoc.unwrap_or(&generator.compiler).to_string();
        let python = python.unwrap_or(&generator.python).to_string();
        let prober = self.prober();

        let report = CheckReport {
            compiler_status: prober.compiler_version(&ToolCommand::new(compiler.clone())),
            toolchain_status: prober.toolchain_available(&python),
            dependencies: prober.check_dependencies(&python),
            compiler,
            python,
        };

        if format == "json" {
            format_check_report_json(&report)
        } else {
            Ok(format_check_report_text(&report))
        }
    }

    fn handle_install_tools(&self, python: Option<&str>, yes: bool) -> Result<String, ApiError> {
        let python = python.unwrap_or(&self.config.generator.python);
        if !yes && !confirm(&format!("Install {} with {} -m pip?", TOOLCHAIN_PACKAGE, python))? {
            return Ok("Installation cancelled".to_string());
        }
        let result = self.prober().install_toolchain(python);
        if result.ok {
            Ok(format!("Installed {}", TOOLCHAIN_PACKAGE))
        } else {
            Err(ApiError::InstallFailed(result.detail))
        }
    }

    fn handle_discover(&self, dir: &Path, format: &str) -> Result<String, ApiError> {
        if !dir.is_dir() {
            return Err(ApiError::InputNotFound(dir.to_path_buf()));
        }
        let files = discover_schema_files(dir)?;
        format_discovered_files(dir, &files, format)
    }
}

fn confirm(prompt: &str) -> Result<bool, ApiError> {
    use dialoguer::Confirm;
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(prompt_error)
}

fn prompt_error(err: dialoguer::Error) -> ApiError {
    ApiError::PromptFailed(err.to_string())
}
