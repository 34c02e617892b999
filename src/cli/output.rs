//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, ValidationError};

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Validation(ValidationError::NoInputFiles) => {
            "Error: no input files (pass .proto files or folders to `generate`)".to_string()
        }
        ApiError::Validation(ValidationError::NoOutputDirectory) => {
            "Error: no output directory (use --out or set generator.output_dir)".to_string()
        }
        ApiError::Validation(ValidationError::NoTargetSelected) => {
            "Error: no generation target selected (use --java, --python or --grpc)".to_string()
        }
        ApiError::PromptFailed(detail) => {
            format!("Error: could not read confirmation ({}); pass --yes to skip the prompt", detail)
        }
        other => format!("Error: {}", other),
    }
}
