//! Background worker and caller-side handle for generation runs.

use crate::error::ApiError;
use crate::generation::events::{FailurePolicy, RunEvent, TerminalUpdate};
use crate::generation::executor::{BatchExecutor, EventSink};
use crate::job::JobDescriptor;
use crate::process::{CancelToken, ProcessRunner, SystemProcessRunner};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info};

/// Starts generation runs on a worker thread, at most one at a time.
pub struct BatchRunner<P: ProcessRunner + 'static = SystemProcessRunner> {
    process: Arc<P>,
    policy: FailurePolicy,
    active: Arc<AtomicBool>,
}

impl BatchRunner<SystemProcessRunner> {
    pub fn new() -> Self {
        Self::with_process_runner(Arc::new(SystemProcessRunner::new()))
    }
}

impl Default for BatchRunner<SystemProcessRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ProcessRunner + 'static> BatchRunner<P> {
    pub fn with_process_runner(process: Arc<P>) -> Self {
        Self {
            process,
            policy: FailurePolicy::default(),
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// True while a worker (including a cancelled one still shutting down) is alive.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Hand `job` to a new worker thread.
    ///
    /// Fails with [`ApiError::RunInProgress`] if a previous worker is still active.
    pub fn start(&self, job: JobDescriptor) -> Result<RunHandle, ApiError> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ApiError::RunInProgress);
        }
        let guard = ActiveGuard(Arc::clone(&self.active));

        let (sender, events) = mpsc::channel();
        let cancel = CancelToken::new();
        let sink = EventSink::new(sender, cancel.clone());
        let worker_cancel = cancel.clone();
        let process = Arc::clone(&self.process);
        let policy = self.policy;

        let worker = thread::Builder::new()
            .name("protobatch-worker".to_string())
            .spawn(move || {
                let _guard = guard;
                run_worker(process.as_ref(), &job, &worker_cancel, policy, &sink);
            })?;

        Ok(RunHandle {
            events,
            cancel,
            worker: Some(worker),
            done: false,
        })
    }

    /// Start a run and block until its terminal event.
    ///
    /// Returns every event received, in order.
    pub fn run_to_completion(&self, job: JobDescriptor) -> Result<Vec<RunEvent>, ApiError> {
        let mut handle = self.start(job)?;
        let events: Vec<RunEvent> = handle.events().collect();
        handle.join();
        Ok(events)
    }
}

fn run_worker<P: ProcessRunner + ?Sized>(
    process: &P,
    job: &JobDescriptor,
    cancel: &CancelToken,
    policy: FailurePolicy,
    sink: &EventSink,
) {
    let executor = BatchExecutor::new(process, cancel, policy);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| executor.execute(job, sink)));
    match outcome {
        Ok(Some(result)) => sink.terminal(TerminalUpdate::from_result(result)),
        Ok(None) => info!("generation cancelled"),
        Err(payload) => {
            let cause = panic_cause(payload.as_ref());
            error!(cause = %cause, "generation worker panicked");
            sink.terminal(TerminalUpdate::from_result(
                executor.fault_result(job, &cause),
            ));
        }
    }
}

fn panic_cause(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

struct ActiveGuard(Arc<AtomicBool>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Caller side of a run: drains notifications and requests cancellation.
pub struct RunHandle {
    events: Receiver<RunEvent>,
    cancel: CancelToken,
    worker: Option<JoinHandle<()>>,
    done: bool,
}

impl RunHandle {
    /// Block for the next event. `None` once the terminal event was delivered,
    /// the run was cancelled, or the worker ended.
    pub fn recv(&mut self) -> Option<RunEvent> {
        if self.done {
            return None;
        }
        match self.events.recv() {
            Ok(event) => self.accept(event),
            Err(_) => {
                self.done = true;
                None
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv) for callers polling from a
    /// UI loop.
    pub fn try_recv(&mut self) -> Option<RunEvent> {
        if self.done {
            return None;
        }
        match self.events.try_recv() {
            Ok(event) => self.accept(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.done = true;
                None
            }
        }
    }

    pub fn events(&mut self) -> impl Iterator<Item = RunEvent> + '_ {
        std::iter::from_fn(move || self.recv())
    }

    /// Drain events until the terminal one.
    pub fn wait(mut self) -> Option<TerminalUpdate> {
        while let Some(event) = self.recv() {
            if let RunEvent::Terminal(update) = event {
                return Some(update);
            }
        }
        None
    }

    /// Hard-stop the run: the in-flight subprocess is killed and no further
    /// events are delivered through this handle.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.done = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// True once the worker thread has exited (or was already joined).
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the worker thread to exit.
    pub fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("generation worker thread panicked");
            }
        }
    }

    fn accept(&mut self, event: RunEvent) -> Option<RunEvent> {
        if self.cancel.is_cancelled() {
            self.done = true;
            return None;
        }
        if event.is_terminal() {
            self.done = true;
        }
        Some(event)
    }
}
