//! Generation executor: runs a job's files in order on the current thread.
//! Owns the per-file algorithm and event emission; process spawning stays behind
//! [`ProcessRunner`].

use crate::error::ProcessError;
use crate::generation::events::{
    display_name, FailureDetail, FailurePolicy, GenerationOutcome, ProgressUpdate, RunEvent,
    RunResult, TerminalUpdate,
};
use crate::job::{JobDescriptor, Target};
use crate::plan;
use crate::process::{CancelToken, ProcessRunner};
use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use tracing::{debug, info, warn};

/// Sending side of a run's notification channel.
///
/// Nothing is sent once the run's cancel token has fired.
pub struct EventSink {
    sender: Sender<RunEvent>,
    cancel: CancelToken,
}

impl EventSink {
    pub fn new(sender: Sender<RunEvent>, cancel: CancelToken) -> Self {
        Self { sender, cancel }
    }

    pub fn progress(&self, update: ProgressUpdate) {
        self.send(RunEvent::Progress(update));
    }

    pub fn terminal(&self, update: TerminalUpdate) {
        self.send(RunEvent::Terminal(update));
    }

    fn send(&self, event: RunEvent) {
        if self.cancel.is_cancelled() {
            return;
        }
        if self.sender.send(event).is_err() {
            debug!("run event dropped: receiver gone");
        }
    }
}

enum StepError {
    Failed(FailureDetail),
    Cancelled,
}

/// Executes one job, one schema file at a time.
pub struct BatchExecutor<'a, P: ProcessRunner + ?Sized> {
    process: &'a P,
    cancel: &'a CancelToken,
    policy: FailurePolicy,
    // Progress so far, kept outside `execute` so a fault can still be reported
    current: RefCell<Option<(Target, PathBuf)>>,
    processed: Cell<usize>,
    failed: Cell<usize>,
}

impl<'a, P: ProcessRunner + ?Sized> BatchExecutor<'a, P> {
    pub fn new(process: &'a P, cancel: &'a CancelToken, policy: FailurePolicy) -> Self {
        Self {
            process,
            cancel,
            policy,
            current: RefCell::new(None),
            processed: Cell::new(0),
            failed: Cell::new(0),
        }
    }

    /// Result for a run that died without finishing: the step in flight is
    /// reported as the failure, with `cause` as its message.
    pub fn fault_result(&self, job: &JobDescriptor, cause: &str) -> RunResult {
        let (target, file) = self.current.borrow_mut().take().unwrap_or_else(|| {
            (
                job.targets().first().copied().unwrap_or(Target::Java),
                job.schema_files().first().cloned().unwrap_or_default(),
            )
        });
        RunResult {
            files_processed: self.processed.get(),
            total_files: job.schema_files().len(),
            files_failed: self.failed.get() + 1,
            failure: Some(FailureDetail::fault(
                target,
                &file,
                format!("internal worker fault: {}", cause),
            )),
        }
    }

    /// Run every file and emit progress. Returns `None` if the run was cancelled.
    pub fn execute(&self, job: &JobDescriptor, sink: &EventSink) -> Option<RunResult> {
        let files = job.schema_files();
        let total = files.len();
        let mut result = RunResult {
            files_processed: 0,
            total_files: total,
            files_failed: 0,
            failure: None,
        };

        info!(
            files = total,
            targets = ?job.targets(),
            output_root = %job.output_root().display(),
            "generation started"
        );

        for (position, file) in files.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return None;
            }
            match self.process_file(job, file) {
                Ok(outcomes) => {
                    result.files_processed += 1;
                    self.processed.set(result.files_processed);
                    debug!(file = %file.display(), invocations = outcomes.len(), "file processed");
                    sink.progress(ProgressUpdate::new(file, position + 1, total));
                }
                Err(StepError::Cancelled) => return None,
                Err(StepError::Failed(detail)) => {
                    warn!(
                        file = %file.display(),
                        generator = %detail.target,
                        exit_code = ?detail.exit_code,
                        "generation failed"
                    );
                    result.files_failed += 1;
                    self.failed.set(result.files_failed);
                    if result.failure.is_none() {
                        result.failure = Some(detail);
                    }
                    if self.policy == FailurePolicy::FailFast {
                        break;
                    }
                }
            }
        }

        if self.cancel.is_cancelled() {
            return None;
        }
        info!(
            processed = result.files_processed,
            failed = result.files_failed,
            "generation finished"
        );
        Some(result)
    }

    fn process_file(
        &self,
        job: &JobDescriptor,
        file: &Path,
    ) -> Result<Vec<GenerationOutcome>, StepError> {
        let mut outcomes = Vec::new();
        for invocation in plan::file_invocations(job, file) {
            if self.cancel.is_cancelled() {
                return Err(StepError::Cancelled);
            }
            let target = invocation.target;
            self.current.replace(Some((target, file.to_path_buf())));
            let out_dir = plan::output_dir(job, target);
            fs::create_dir_all(&out_dir).map_err(|e| {
                StepError::Failed(FailureDetail::fault(
                    target,
                    file,
                    format!("failed to create {}: {}", out_dir.display(), e),
                ))
            })?;

            info!(
                generator = %target,
                file = %display_name(file),
                "generating {} code",
                target.label()
            );
            let output = match self.process.run(&invocation, self.cancel) {
                Ok(output) => output,
                Err(ProcessError::Cancelled) => return Err(StepError::Cancelled),
                Err(err) => {
                    return Err(StepError::Failed(FailureDetail::fault(
                        target,
                        file,
                        err.to_string(),
                    )))
                }
            };

            let outcome = GenerationOutcome {
                target,
                exit_code: output.exit_code,
                stderr: output.stderr,
            };
            if !outcome.succeeded() {
                return Err(StepError::Failed(FailureDetail::from_outcome(file, &outcome)));
            }
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}
