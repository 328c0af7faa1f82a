//! Run configuration.
//!
//! `IngressConfig` is built once at startup and shared read-only with the
//! supervisor and backends. The Nomad client settings live in a separate
//! JSON file, by default `~/.ingress/nomad.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::adapters::Executables;
use crate::domain::{parse_port_mappings, BackendKind, PortMapping};
use crate::error::{Error, Result};

/// Fixed delay between supervisor iterations.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Kubernetes namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Default Nomad HTTP API port.
pub const DEFAULT_NOMAD_API_PORT: u16 = 4646;

// ============================================================================
// IngressConfig
// ============================================================================

/// Whether the supervisor keeps the forward alive or runs it once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunMode {
    /// Restart the forward forever.
    #[default]
    AlwaysOn,
    /// Run the forward once and report its result.
    OneShot,
}

/// Immutable configuration for a single run.
#[derive(Debug, Clone)]
pub struct IngressConfig {
    /// Selected forwarding strategy.
    pub backend: BackendKind,
    /// Service reference, interpreted by the backend.
    pub service: String,
    /// Parsed port mappings, in the order given.
    pub mappings: Vec<PortMapping>,
    /// Kubernetes namespace.
    pub namespace: String,
    /// Location of the Nomad client configuration file.
    pub nomad_config_path: PathBuf,
    /// Retry behavior.
    pub mode: RunMode,
    /// Delay between supervisor iterations.
    pub retry_delay: Duration,
    /// socat and kubectl locations.
    pub executables: Executables,
}

impl IngressConfig {
    /// Creates a configuration with defaults for everything but the
    /// backend, service and port specs.
    ///
    /// Fails with `Error::Parse` if any port spec is malformed.
    pub fn new<S: AsRef<str>>(
        backend: BackendKind,
        service: impl Into<String>,
        port_specs: &[S],
    ) -> Result<Self> {
        Ok(Self {
            backend,
            service: service.into(),
            mappings: parse_port_mappings(port_specs)?,
            namespace: DEFAULT_NAMESPACE.to_string(),
            nomad_config_path: default_nomad_config_path(),
            mode: RunMode::AlwaysOn,
            retry_delay: DEFAULT_RETRY_DELAY,
            executables: Executables::discover(),
        })
    }

    /// Sets the Kubernetes namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the Nomad client configuration path.
    pub fn with_nomad_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.nomad_config_path = path.into();
        self
    }

    /// Sets the run mode.
    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the delay between supervisor iterations.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sets the executable locations.
    pub fn with_executables(mut self, executables: Executables) -> Self {
        self.executables = executables;
        self
    }
}

/// Default Nomad client configuration path: `~/.ingress/nomad.json`.
///
/// Falls back to a relative path when the home directory is unknown.
pub fn default_nomad_config_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".ingress"))
        .unwrap_or_else(|| PathBuf::from(".ingress"))
        .join("nomad.json")
}

// ============================================================================
// NomadClientConfig
// ============================================================================

/// Connection settings for the Nomad HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NomadClientConfig {
    /// Host name or address, optionally with an `http://` or `https://` scheme.
    pub address: String,

    /// HTTP API port.
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

fn default_api_port() -> u16 {
    DEFAULT_NOMAD_API_PORT
}

impl NomadClientConfig {
    /// Creates a config for the given address on the default API port.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            api_port: DEFAULT_NOMAD_API_PORT,
        }
    }

    /// Loads the configuration from a JSON file.
    ///
    /// A missing file is a configuration error: Nomad cannot be reached
    /// without it.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Nomad client config not found at {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::Config(format!(
                "Failed to read Nomad client config {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse Nomad client config {}: {}",
                path.display(),
                e
            ))
        })?;

        if config.address.trim().is_empty() {
            return Err(Error::Config(format!(
                "Nomad client config {} has an empty address",
                path.display()
            )));
        }

        Ok(config)
    }

    /// Base URL of the HTTP API, e.g. `http://localhost:4646`.
    pub fn base_url(&self) -> String {
        let address = self.address.trim().trim_end_matches('/');
        if address.starts_with("http://") || address.starts_with("https://") {
            format!("{}:{}", address, self.api_port)
        } else {
            format!("http://{}:{}", address, self.api_port)
        }
    }
}
