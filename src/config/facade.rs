//! Config loading facade: assembles sources in precedence order and deserializes.

use crate::config::merge::{builder_with_defaults, with_environment};
use crate::config::sources::{global_file, workspace_file};
use crate::config::ProtobatchConfig;
use crate::error::ApiError;
use config::{File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads [`ProtobatchConfig`] from files and the environment.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, global file, `<workspace_root>/protobatch.toml`, environment.
    pub fn load(workspace_root: &Path) -> Result<ProtobatchConfig, ApiError> {
        let global = Self::global_config_path();
        Self::load_from_sources(global.as_deref(), workspace_root)
    }

    /// Defaults, the given file (must exist), environment.
    pub fn load_from_file(path: &Path) -> Result<ProtobatchConfig, ApiError> {
        let builder = builder_with_defaults()?
            .add_source(File::from(path).format(FileFormat::Toml).required(true));
        let config = with_environment(builder)
            .build()?
            .try_deserialize::<ProtobatchConfig>()?;
        debug!(config_path = %path.display(), "configuration loaded from file");
        Ok(config)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
        workspace_file::workspace_config_path(workspace_root)
    }

    pub(crate) fn load_from_sources(
        global: Option<&Path>,
        workspace_root: &Path,
    ) -> Result<ProtobatchConfig, ApiError> {
        let builder = builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder, global);
        let builder = workspace_file::add_to_builder(builder, workspace_root);
        let config = with_environment(builder)
            .build()?
            .try_deserialize::<ProtobatchConfig>()?;
        debug!(workspace = %workspace_root.display(), "configuration loaded");
        Ok(config)
    }
}
