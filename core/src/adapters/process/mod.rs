//! Child process adapter.
//!
//! Spawns forwarding processes with tokio, pipes their output into tracing
//! and turns exits and error output into `Result`s.

mod levels;
mod runner;

pub use levels::{infer_level, LineLevel};
pub use runner::{run_monitored, ProcessRunner};
