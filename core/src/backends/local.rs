//! Local backend: socat straight to the service.
//!
//! Used for Docker networks and any host the machine can resolve. Each
//! mapping gets its own socat process; the first one to finish ends the
//! forward and its siblings are killed with it.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use futures::future::select_all;
use tracing::{info, warn};

use crate::domain::{FailurePolicy, PortMapping, ProxyCommand};
use crate::error::{Error, Result};
use crate::ports::{ForwardBackend, ProcessLauncher};

type LaunchFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Forwards each mapping with its own socat process.
pub struct LocalBackend<L: ProcessLauncher> {
    launcher: L,
    socat: PathBuf,
    mapping_limit: Option<usize>,
}

impl<L: ProcessLauncher> LocalBackend<L> {
    /// Creates a backend that runs `socat` through `launcher`.
    pub fn new(launcher: L, socat: impl Into<PathBuf>) -> Self {
        Self {
            launcher,
            socat: socat.into(),
            mapping_limit: None,
        }
    }

    /// Rejects runs with more than `limit` mappings.
    pub fn with_mapping_limit(mut self, limit: usize) -> Self {
        self.mapping_limit = Some(limit);
        self
    }

    /// Builds the socat invocation for one mapping.
    ///
    /// `socat tcp-l:<local>,fork,reuseaddr tcp:<service>:<remote>`
    pub fn build_command(&self, service: &str, mapping: &PortMapping) -> ProxyCommand {
        ProxyCommand::new(&self.socat, format!("socat {}", mapping))
            .arg(format!("tcp-l:{},fork,reuseaddr", mapping.local))
            .arg(format!("tcp:{}:{}", service, mapping.remote))
            .failure_policy(FailurePolicy::ExitOnly)
    }

    fn validate(&self, mappings: &[PortMapping]) -> Result<()> {
        if mappings.is_empty() {
            return Err(Error::Config("at least one port mapping is required".into()));
        }

        if let Some(limit) = self.mapping_limit {
            if mappings.len() > limit {
                return Err(Error::Config(format!(
                    "only {} port mapping supported, got {}",
                    limit,
                    mappings.len()
                )));
            }
        }

        Ok(())
    }
}

impl<L: ProcessLauncher> ForwardBackend for LocalBackend<L> {
    async fn run(&self, service: &str, mappings: &[PortMapping]) -> Result<()> {
        self.validate(mappings)?;

        let launches: Vec<LaunchFuture<'_>> = mappings
            .iter()
            .map(|mapping| {
                info!(service = %service, mapping = %mapping, "Forwarding port");
                let command = self.build_command(service, mapping);
                Box::pin(self.launcher.launch(command)) as LaunchFuture<'_>
            })
            .collect();

        let (result, index, remaining) = select_all(launches).await;

        if !remaining.is_empty() {
            warn!(
                service = %service,
                mapping = %mappings[index],
                stopping = remaining.len(),
                "Forward ended, stopping remaining port forwards"
            );
        }
        // Dropping an in-flight launch kills its child process.
        drop(remaining);

        result
    }
}
