//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::Commands;

/// Command name string for log fields (e.g. "generate", "install_tools").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Generate(_) => "generate",
        Commands::Check { .. } => "check",
        Commands::InstallTools { .. } => "install_tools",
        Commands::Discover { .. } => "discover",
    }
}
