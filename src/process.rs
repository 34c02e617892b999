//! Subprocess execution
//!
//! The Batch Runner and the probes talk to external tools only through
//! [`ProcessRunner`]. [`SystemProcessRunner`] spawns real processes from an
//! argument vector (no shell), captures stdout and stderr separately, and
//! polls for exit so that a [`CancelToken`] or a timeout can kill the child.

use crate::error::ProcessError;
use crate::plan::Invocation;
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Exit code reported when a process was terminated without one (e.g. by a signal).
pub const NO_EXIT_CODE: i32 = -1;

/// Captured result of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Shared cancellation flag between a caller and a worker
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Executes composed invocations.
pub trait ProcessRunner: Send + Sync {
    /// Run to completion. Returns [`ProcessError::Cancelled`] if `cancel` fires
    /// while the process is running; the process is killed in that case.
    fn run(
        &self,
        invocation: &Invocation,
        cancel: &CancelToken,
    ) -> Result<ProcessOutput, ProcessError>;
}

/// Runs real processes via `std::process::Command`.
#[derive(Debug, Clone)]
pub struct SystemProcessRunner {
    timeout: Option<Duration>,
    poll_interval: Duration,
}

impl Default for SystemProcessRunner {
    fn default() -> Self {
        Self {
            timeout: None,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }
}

impl SystemProcessRunner {
    const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

    /// Runner without a timeout, used for generation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner that kills processes exceeding `timeout`, used for probes.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }

    fn spawn(&self, invocation: &Invocation) -> Result<Child, ProcessError> {
        Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: invocation.program.clone(),
                source,
            })
    }
}

impl ProcessRunner for SystemProcessRunner {
    fn run(
        &self,
        invocation: &Invocation,
        cancel: &CancelToken,
    ) -> Result<ProcessOutput, ProcessError> {
        debug!(
            program = %invocation.program,
            args = %invocation.display_args(),
            "spawning process"
        );
        let mut child = self.spawn(invocation)?;
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);
        let started = Instant::now();

        let status = loop {
            if cancel.is_cancelled() {
                kill_quietly(&mut child);
                return Err(ProcessError::Cancelled);
            }
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if let Some(timeout) = self.timeout {
                if started.elapsed() >= timeout {
                    kill_quietly(&mut child);
                    return Err(ProcessError::TimedOut {
                        program: invocation.program.clone(),
                        timeout,
                    });
                }
            }
            thread::sleep(self.poll_interval);
        };

        Ok(ProcessOutput {
            exit_code: status.code().unwrap_or(NO_EXIT_CODE),
            stdout: collect(stdout),
            stderr: collect(stderr),
        })
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

fn kill_quietly(child: &mut Child) {
    if let Err(err) = child.kill() {
        warn!(error = %err, "failed to kill child process");
    }
    let _ = child.wait();
}
