//! Nomad adapter.
//!
//! Resolves `job.group.task` references to the addresses of running
//! allocations via the Nomad HTTP API.

mod client;
pub mod models;

pub use client::NomadClient;
