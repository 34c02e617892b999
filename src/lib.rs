//! Protobatch: batch protocol-buffer code generation
//!
//! Runs `protoc` (Java) and the Python `grpcio-tools` toolchain over a list of
//! `.proto` files on a background worker, reporting per-file progress and a
//! single terminal outcome to the caller.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod generation;
pub mod job;
pub mod logging;
pub mod plan;
pub mod probe;
pub mod process;
