//! Notifications and results produced by a generation run.

use crate::job::Target;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What the runner does after a file fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the whole run at the first failing invocation
    #[default]
    FailFast,
    /// Skip the rest of the failing file and continue with the next one
    ContinueOnFailure,
}

/// Result of one invocation for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub target: Target,
    pub exit_code: i32,
    pub stderr: String,
}

impl GenerationOutcome {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// The first failing invocation of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetail {
    pub target: Target,
    pub file: PathBuf,
    /// `None` when the process never ran to an exit (spawn or filesystem fault)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub stderr: String,
}

impl FailureDetail {
    pub fn from_outcome(file: &Path, outcome: &GenerationOutcome) -> Self {
        Self {
            target: outcome.target,
            file: file.to_path_buf(),
            exit_code: Some(outcome.exit_code),
            stderr: outcome.stderr.clone(),
        }
    }

    pub fn fault(target: Target, file: &Path, cause: impl Into<String>) -> Self {
        Self {
            target,
            file: file.to_path_buf(),
            exit_code: None,
            stderr: cause.into(),
        }
    }

    pub fn message(&self) -> String {
        format!(
            "{} generation failed for {}: {}",
            self.target.label(),
            display_name(&self.file),
            self.stderr.trim()
        )
    }
}

/// Aggregate outcome of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    /// Files for which every enabled target succeeded
    pub files_processed: usize,
    pub total_files: usize,
    /// Files that failed (more than one only under `ContinueOnFailure`)
    pub files_failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureDetail>,
}

impl RunResult {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub file: PathBuf,
    /// 1-based position of the file in the job
    pub index: usize,
    pub total: usize,
    pub message: String,
}

impl ProgressUpdate {
    pub fn new(file: &Path, index: usize, total: usize) -> Self {
        Self {
            file: file.to_path_buf(),
            index,
            total,
            message: format!("Processed {} ({}/{})", display_name(file), index, total),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalUpdate {
    pub success: bool,
    pub message: String,
    pub result: RunResult,
}

impl TerminalUpdate {
    pub fn from_result(result: RunResult) -> Self {
        let message = match &result.failure {
            None => format!("Successfully processed {} files", result.files_processed),
            Some(detail) if result.files_failed <= 1 => detail.message(),
            Some(detail) => format!(
                "Processed {} of {} files, {} failed. First failure: {}",
                result.files_processed,
                result.total_files,
                result.files_failed,
                detail.message()
            ),
        };
        Self {
            success: result.succeeded(),
            message,
            result,
        }
    }
}

/// Notification emitted by a run: zero or more `Progress`, then one `Terminal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    Progress(ProgressUpdate),
    Terminal(TerminalUpdate),
}

impl RunEvent {
    pub fn message(&self) -> &str {
        match self {
            RunEvent::Progress(p) => &p.message,
            RunEvent::Terminal(t) => &t.message,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunEvent::Terminal(_))
    }
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
