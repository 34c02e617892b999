//! CLI parse: clap types for Protobatch. No behavior; definitions only.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Protobatch CLI - batch protocol-buffer code generation
#[derive(Parser)]
#[command(name = "protobatch")]
#[command(about = "Generate Java and Python sources from many .proto files in one run")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (where protobatch.toml is looked up)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run code generation over .proto files and folders
    Generate(GenerateArgs),
    /// Report compiler and Python toolchain availability
    Check {
        /// Schema compiler to probe (defaults to config)
        #[arg(long)]
        protoc: Option<String>,
        /// Python interpreter to probe (defaults to config)
        #[arg(long)]
        python_exe: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
    /// Install the Python gRPC toolchain with pip
    InstallTools {
        /// Python interpreter to install into (defaults to config)
        #[arg(long)]
        python_exe: Option<String>,
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
    /// List .proto files found under a folder
    Discover {
        /// Folder to search recursively
        dir: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Schema files or folders (folders are searched recursively for *.proto)
    pub inputs: Vec<PathBuf>,

    /// Output root; generated sources go to <out>/java and <out>/python
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,

    /// Generate Java sources
    #[arg(long)]
    pub java: bool,

    /// Generate Python message modules
    #[arg(long)]
    pub python: bool,

    /// Generate Python message modules and gRPC stubs
    #[arg(long)]
    pub grpc: bool,

    /// Schema compiler program or path
    #[arg(long)]
    pub protoc: Option<String>,

    /// Python interpreter running grpcio-tools
    #[arg(long)]
    pub python_exe: Option<String>,

    /// Additional include directory (repeatable)
    #[arg(long = "include", short = 'I')]
    pub include: Vec<PathBuf>,

    /// Keep going with the next file after a failure
    #[arg(long)]
    pub continue_on_failure: bool,

    /// Skip the gRPC toolchain check before the run
    #[arg(long)]
    pub skip_preflight: bool,

    /// Install a missing toolchain without asking
    #[arg(long)]
    pub yes: bool,

    /// Output format (text or json)
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,
}
