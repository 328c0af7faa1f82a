//! Nomad backend: resolve the task's address, then forward with socat.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use super::local::LocalBackend;
use super::resolver::select_endpoint;
use crate::domain::{Endpoint, NomadTask, PortMapping};
use crate::error::{Error, Result};
use crate::ports::{EndpointCatalog, ForwardBackend, ProcessLauncher};

/// Forwards to a randomly chosen running instance of a Nomad task.
///
/// The service reference is `job.group.task` and exactly one mapping is
/// accepted; its remote side names the port (label) to resolve.
pub struct NomadBackend<C: EndpointCatalog, L: ProcessLauncher> {
    catalog: C,
    local: LocalBackend<L>,
    rng: Mutex<StdRng>,
}

impl<C: EndpointCatalog, L: ProcessLauncher> NomadBackend<C, L> {
    /// Creates a backend that resolves through `catalog` and forwards with
    /// a single-mapping local backend.
    pub fn new(catalog: C, local: LocalBackend<L>) -> Self {
        Self {
            catalog,
            local: local.with_mapping_limit(1),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Replaces the random source used to pick among instances.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    /// Resolves `task` to one endpoint exposing `port`.
    pub async fn resolve(&self, task: &NomadTask, port: &str) -> Result<Endpoint> {
        let records = self.catalog.endpoints(task).await?;
        let mut rng = self.rng.lock();
        select_endpoint(&task.to_string(), &records, port, &mut *rng)
    }
}

impl<C: EndpointCatalog, L: ProcessLauncher> ForwardBackend for NomadBackend<C, L> {
    async fn run(&self, service: &str, mappings: &[PortMapping]) -> Result<()> {
        if mappings.len() != 1 {
            return Err(Error::Config(format!(
                "only 1 port mapping supported, got {}",
                mappings.len()
            )));
        }

        let task = NomadTask::parse(service)?;
        let mapping = &mappings[0];
        let endpoint = self.resolve(&task, &mapping.remote).await?;

        info!(
            service = %task,
            port = %mapping.remote,
            endpoint = %endpoint,
            "Resolved Nomad endpoint"
        );

        let rewritten = mapping.with_remote(endpoint.port);
        self.local.run(&endpoint.address, &[rewritten]).await
    }
}
