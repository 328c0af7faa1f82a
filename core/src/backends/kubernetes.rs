//! Kubernetes backend: a single `kubectl port-forward` for all mappings.

use std::path::PathBuf;

use tracing::info;

use crate::domain::{display_mappings, FailurePolicy, PortMapping, ProxyCommand};
use crate::error::{Error, Result};
use crate::ports::{ForwardBackend, ProcessLauncher};

/// Address kubectl binds the local ports on.
const BIND_ADDRESS: &str = "0.0.0.0";

/// Forwards through `kubectl port-forward`.
///
/// kubectl can keep running, and even exit 0, while it logs connection
/// errors, so the process is run with `FailurePolicy::ExitOrErrorOutput`.
pub struct KubernetesBackend<L: ProcessLauncher> {
    launcher: L,
    kubectl: PathBuf,
    namespace: String,
}

impl<L: ProcessLauncher> KubernetesBackend<L> {
    /// Creates a backend forwarding into `namespace`.
    pub fn new(launcher: L, kubectl: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            launcher,
            kubectl: kubectl.into(),
            namespace: namespace.into(),
        }
    }

    /// Builds the kubectl invocation.
    ///
    /// `kubectl port-forward -n <ns> <service> --address 0.0.0.0 <l:r>...`
    pub fn build_command(&self, service: &str, mappings: &[PortMapping]) -> ProxyCommand {
        ProxyCommand::new(&self.kubectl, format!("kubectl {}", service))
            .args([
                "port-forward",
                "-n",
                self.namespace.as_str(),
                service,
                "--address",
                BIND_ADDRESS,
            ])
            .args(mappings.iter().map(ToString::to_string))
            .failure_policy(FailurePolicy::ExitOrErrorOutput)
    }
}

impl<L: ProcessLauncher> ForwardBackend for KubernetesBackend<L> {
    async fn run(&self, service: &str, mappings: &[PortMapping]) -> Result<()> {
        if mappings.is_empty() {
            return Err(Error::Config("at least one port mapping is required".into()));
        }

        info!(
            service = %service,
            namespace = %self.namespace,
            mappings = %display_mappings(mappings),
            "Starting kubectl port-forward"
        );

        self.launcher
            .launch(self.build_command(service, mappings))
            .await
    }
}
