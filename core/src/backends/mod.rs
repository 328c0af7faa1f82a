//! Forwarding backends.
//!
//! Three strategies implement `ForwardBackend`:
//! - `LocalBackend`: one socat per mapping, for Docker networks and plain hosts
//! - `KubernetesBackend`: one `kubectl port-forward` for all mappings
//! - `NomadBackend`: resolve `job.group.task` via the Nomad API, then socat
//!
//! `Backend` is the closed set the CLI selects from.

mod kubernetes;
mod local;
mod nomad;
mod resolver;

#[cfg(test)]
pub(crate) mod testing;

pub use kubernetes::KubernetesBackend;
pub use local::LocalBackend;
pub use nomad::NomadBackend;
pub use resolver::select_endpoint;

use crate::adapters::{NomadClient, ProcessRunner};
use crate::config::{IngressConfig, NomadClientConfig};
use crate::domain::{BackendKind, PortMapping};
use crate::error::Result;
use crate::ports::ForwardBackend;

/// The backend selected for a run.
pub enum Backend {
    Local(LocalBackend<ProcessRunner>),
    Kubernetes(KubernetesBackend<ProcessRunner>),
    Nomad(NomadBackend<NomadClient, ProcessRunner>),
}

impl Backend {
    /// Builds the backend named by `config.backend`.
    ///
    /// For Nomad this loads the client configuration file; a missing or
    /// invalid file is a configuration error.
    pub async fn from_config(config: &IngressConfig) -> Result<Self> {
        let local = || LocalBackend::new(ProcessRunner::new(), &config.executables.socat);

        Ok(match config.backend {
            BackendKind::Local => Backend::Local(local()),
            BackendKind::Kubernetes => Backend::Kubernetes(KubernetesBackend::new(
                ProcessRunner::new(),
                &config.executables.kubectl,
                &config.namespace,
            )),
            BackendKind::Nomad => {
                let client_config = NomadClientConfig::load(&config.nomad_config_path).await?;
                let client = NomadClient::new(&client_config)?;
                Backend::Nomad(NomadBackend::new(client, local()))
            }
        })
    }

    /// Returns which strategy this is.
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Local(_) => BackendKind::Local,
            Backend::Kubernetes(_) => BackendKind::Kubernetes,
            Backend::Nomad(_) => BackendKind::Nomad,
        }
    }
}

impl ForwardBackend for Backend {
    async fn run(&self, service: &str, mappings: &[PortMapping]) -> Result<()> {
        match self {
            Backend::Local(backend) => backend.run(service, mappings).await,
            Backend::Kubernetes(backend) => backend.run(service, mappings).await,
            Backend::Nomad(backend) => backend.run(service, mappings).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[tokio::test]
    async fn test_from_config_selects_backend() {
        let config = IngressConfig::new(BackendKind::Kubernetes, "web", &["8081:8080"])
            .unwrap()
            .with_namespace("prod");
        let backend = Backend::from_config(&config).await.unwrap();
        assert_eq!(backend.kind(), BackendKind::Kubernetes);

        let config =
            IngressConfig::new(BackendKind::Local, "app.internal", &["8081:8080"]).unwrap();
        let backend = Backend::from_config(&config).await.unwrap();
        assert_eq!(backend.kind(), BackendKind::Local);
    }

    #[tokio::test]
    async fn test_nomad_without_client_config_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = IngressConfig::new(BackendKind::Nomad, "api.web.app", &["8081:http"])
            .unwrap()
            .with_nomad_config_path(dir.path().join("nomad.json"));

        let result = Backend::from_config(&config).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_nomad_with_client_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nomad.json");
        std::fs::write(&path, r#"{"address": "localhost"}"#).unwrap();

        let config = IngressConfig::new(BackendKind::Nomad, "api.web.app", &["8081:http"])
            .unwrap()
            .with_nomad_config_path(path);

        let backend = Backend::from_config(&config).await.unwrap();
        assert_eq!(backend.kind(), BackendKind::Nomad);
    }
}
