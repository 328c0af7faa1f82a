//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that backends and the supervisor use
//! to interact with external systems. Implementations live in `adapters`.

mod backend;
mod catalog;
mod launcher;

pub use backend::ForwardBackend;
pub use catalog::EndpointCatalog;
pub use launcher::ProcessLauncher;
