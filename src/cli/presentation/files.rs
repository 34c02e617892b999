//! File listings: generated sources and discovered schema files.

use crate::error::ApiError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Every file under `output_root`, relative to it and sorted.
pub fn list_generated_files(output_root: &Path) -> Result<Vec<PathBuf>, ApiError> {
    if !output_root.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(output_root) {
        let entry = entry.map_err(|e| {
            ApiError::DiscoveryFailed(format!("Failed to walk {}: {}", output_root.display(), e))
        })?;
        if entry.file_type().is_file() {
            let relative = entry
                .path()
                .strip_prefix(output_root)
                .unwrap_or(entry.path())
                .to_path_buf();
            files.push(relative);
        }
    }
    files.sort();
    Ok(files)
}

pub fn format_generated_files(output_root: &Path, files: &[PathBuf]) -> String {
    if files.is_empty() {
        return format!("No files found under {}", output_root.display());
    }
    let mut out = format!(
        "Generated {} files under {}:",
        files.len(),
        output_root.display()
    );
    for file in files {
        out.push_str(&format!("\n  {}", file.display()));
    }
    out
}

pub fn format_discovered_files(
    root: &Path,
    files: &[PathBuf],
    format: &str,
) -> Result<String, ApiError> {
    if format == "json" {
        return serde_json::to_string_pretty(files)
            .map_err(|e| ApiError::DiscoveryFailed(e.to_string()));
    }
    if files.is_empty() {
        return Ok(format!("No .proto files found under {}", root.display()));
    }
    Ok(files
        .iter()
        .map(|f| f.display().to_string())
        .collect::<Vec<_>>()
        .join("\n"))
}
