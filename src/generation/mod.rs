//! Batch Runner: sequential, per-file generation on a background worker.

pub mod events;
pub mod executor;
pub mod runner;

pub use events::{
    FailureDetail, FailurePolicy, GenerationOutcome, ProgressUpdate, RunEvent, RunResult,
    TerminalUpdate,
};
pub use executor::{BatchExecutor, EventSink};
pub use runner::{BatchRunner, RunHandle};
