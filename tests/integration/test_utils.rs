//! Shared fakes for integration tests.

use parking_lot::Mutex;
use protobatch::error::ProcessError;
use protobatch::plan::Invocation;
use protobatch::process::{CancelToken, ProcessOutput, ProcessRunner};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

/// Schema file an invocation was composed for (its last argument).
pub fn invocation_file(invocation: &Invocation) -> PathBuf {
    invocation
        .args
        .last()
        .map(PathBuf::from)
        .unwrap_or_default()
}

pub fn arg_strings(invocation: &Invocation) -> Vec<String> {
    invocation
        .args
        .iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

/// Records every invocation; fails those whose schema file name is listed.
#[derive(Default)]
pub struct RecordingRunner {
    failing: Vec<&'static str>,
    calls: Mutex<Vec<Invocation>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(names: &[&'static str]) -> Self {
        Self {
            failing: names.to_vec(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().clone()
    }

    pub fn called_files(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|inv| file_name(&invocation_file(inv)))
            .collect()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(
        &self,
        invocation: &Invocation,
        _cancel: &CancelToken,
    ) -> Result<ProcessOutput, ProcessError> {
        self.calls.lock().push(invocation.clone());
        let name = file_name(&invocation_file(invocation));
        if self.failing.iter().any(|f| *f == name) {
            return Ok(ProcessOutput {
                exit_code: 1,
                stdout: String::new(),
                stderr: format!("{}:3:1: Expected top-level statement.\n", name),
            });
        }
        Ok(ProcessOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

/// Succeeds immediately except for `block_on`, which signals `started` and
/// then waits until the run is cancelled.
pub struct BlockingRunner {
    block_on: &'static str,
    started: Mutex<Sender<()>>,
    calls: Mutex<Vec<String>>,
}

impl BlockingRunner {
    pub fn new(block_on: &'static str, started: Sender<()>) -> Self {
        Self {
            block_on,
            started: Mutex::new(started),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn called_files(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl ProcessRunner for BlockingRunner {
    fn run(
        &self,
        invocation: &Invocation,
        cancel: &CancelToken,
    ) -> Result<ProcessOutput, ProcessError> {
        let name = file_name(&invocation_file(invocation));
        self.calls.lock().push(name.clone());
        if name == self.block_on {
            let _ = self.started.lock().send(());
            while !cancel.is_cancelled() {
                thread::sleep(Duration::from_millis(5));
            }
            return Err(ProcessError::Cancelled);
        }
        Ok(ProcessOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

/// Panics when asked to compile `panic_on`; succeeds for everything else.
pub struct PanickingRunner {
    panic_on: &'static str,
}

impl PanickingRunner {
    pub fn new(panic_on: &'static str) -> Self {
        Self { panic_on }
    }
}

impl ProcessRunner for PanickingRunner {
    fn run(
        &self,
        invocation: &Invocation,
        _cancel: &CancelToken,
    ) -> Result<ProcessOutput, ProcessError> {
        let name = file_name(&invocation_file(invocation));
        if name == self.panic_on {
            panic!("fake compiler crashed on {}", name);
        }
        Ok(ProcessOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
