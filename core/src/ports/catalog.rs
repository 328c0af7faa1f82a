//! Endpoint catalog port (interface).

use crate::domain::{EndpointRecord, NomadTask};
use crate::error::Result;

/// Port for looking up where a Nomad task is running.
pub trait EndpointCatalog: Send + Sync {
    /// Returns one record per running instance of the task.
    ///
    /// Transport failures are reported as `Error::Resolution`.
    fn endpoints(
        &self,
        task: &NomadTask,
    ) -> impl std::future::Future<Output = Result<Vec<EndpointRecord>>> + Send;
}
