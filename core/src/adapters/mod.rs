//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! Each adapter handles communication with external systems.

pub mod discovery;
pub mod nomad;
pub mod process;

// Re-export main types for convenience
pub use discovery::Executables;
pub use nomad::NomadClient;
pub use process::ProcessRunner;
