//! Schema file discovery
//!
//! Expands user-supplied inputs into the ordered, duplicate-free list of
//! `.proto` files a job is built from. Folders are searched recursively.

use crate::error::ApiError;
use crate::job::dedup_preserving_order;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File extension of schema files.
pub const SCHEMA_EXTENSION: &str = "proto";

/// Recursively find `*.proto` files under `root`, sorted by path for determinism.
///
/// Symlinked files are listed; symlinked directories are not descended into.
pub fn discover_schema_files(root: &Path) -> Result<Vec<PathBuf>, ApiError> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            ApiError::DiscoveryFailed(format!("Failed to walk {}: {}", root.display(), e))
        })?;
        if entry.path().is_file() && is_schema_file(entry.path()) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    debug!(root = %root.display(), count = found.len(), "discovered schema files");
    Ok(found)
}

pub fn is_schema_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == SCHEMA_EXTENSION)
        .unwrap_or(false)
}

/// Expand inputs in order: files are kept as given, folders contribute their
/// discovered schema files. Paths are made absolute and duplicates removed.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, ApiError> {
    let mut files = Vec::new();
    for input in inputs {
        let absolute =
            dunce::canonicalize(input).map_err(|_| ApiError::InputNotFound(input.clone()))?;
        if absolute.is_dir() {
            files.extend(discover_schema_files(&absolute)?);
        } else {
            files.push(absolute);
        }
    }
    Ok(dedup_preserving_order(files))
}
