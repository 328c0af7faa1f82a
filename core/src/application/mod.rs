//! Application layer - Use case services.
//!
//! The supervisor orchestrates a backend (through the `ForwardBackend`
//! port) according to the configured run mode.

mod supervisor;

pub use supervisor::Supervisor;
