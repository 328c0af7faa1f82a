//! Ingress Core Library
//!
//! Gives a service that runs on a Docker network, in a Kubernetes cluster or
//! in a Nomad cluster a stable local endpoint. Provides functionality to:
//! - Parse `local:remote` port mappings
//! - Resolve `job.group.task` Nomad references to a running instance
//! - Run socat / `kubectl port-forward` and detect failures from exit
//!   status and error output
//! - Supervise the forward, retrying with a fixed delay
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure data models (mappings, references, commands)
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: External system implementations (processes, Nomad API)
//! - `backends`: Forwarding strategies built on the ports
//! - `application`: The supervisor loop
//!
//! # External tools
//! - Local and Nomad backends: `socat`
//! - Kubernetes backend: `kubectl`

pub mod adapters;
pub mod application;
pub mod backends;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

// Re-export domain types (primary API)
pub use domain::{
    parse_port_mappings, BackendKind, Endpoint, EndpointRecord, FailurePolicy, NomadTask,
    PortMapping, ProxyCommand,
};

// Re-export other commonly used types
pub use application::Supervisor;
pub use backends::Backend;
pub use config::{IngressConfig, NomadClientConfig, RunMode};
pub use error::{Error, Result};
pub use ports::ForwardBackend;
