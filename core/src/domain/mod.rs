//! Domain layer - Pure data models.
//!
//! This module contains the values that flow through a forward: port
//! mappings, service references, resolved endpoints and the commands that
//! are eventually spawned. These types have no I/O dependencies and can be
//! tested in isolation.

mod backend_kind;
mod command;
mod mapping;
mod service;

pub use backend_kind::BackendKind;
pub use command::{FailurePolicy, ProxyCommand};
pub use mapping::{display_mappings, parse_port_mappings, PortMapping};
pub use service::{Endpoint, EndpointRecord, NomadTask};
