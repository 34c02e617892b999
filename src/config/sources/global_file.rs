//! Global config file source: `config.toml` in the platform config directory
//! (`$XDG_CONFIG_HOME/protobatch/config.toml` on Linux).

use config::builder::DefaultState;
use config::{ConfigBuilder, File, FileFormat};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path to the global config file, if a home directory can be determined.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "protobatch").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Add the global config file to the builder if it exists.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: Option<&Path>,
) -> ConfigBuilder<DefaultState> {
    match path {
        Some(path) if path.exists() => {
            let canonical = dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
            builder.add_source(File::from(canonical).format(FileFormat::Toml).required(false))
        }
        Some(path) => {
            debug!(config_path = %path.display(), "no global configuration file");
            builder
        }
        None => builder,
    }
}
