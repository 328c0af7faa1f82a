//! Backend selection.

use std::fmt;

use crate::error::Error;

/// The forwarding strategy used for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackendKind {
    /// socat straight to a Docker network or any resolvable host.
    #[default]
    Local,
    /// kubectl port-forward.
    Kubernetes,
    /// Resolve through the Nomad API, then forward with socat.
    Nomad,
}

impl BackendKind {
    /// All available backends.
    pub const ALL: [BackendKind; 3] = [
        BackendKind::Local,
        BackendKind::Kubernetes,
        BackendKind::Nomad,
    ];

    /// Get the canonical name of this backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Kubernetes => "kubernetes",
            BackendKind::Nomad => "nomad",
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "docker" => Ok(BackendKind::Local),
            "kubernetes" | "k8s" => Ok(BackendKind::Kubernetes),
            "nomad" => Ok(BackendKind::Nomad),
            other => Err(Error::Config(format!(
                "unknown backend '{}', expected one of local, kubernetes, nomad",
                other
            ))),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
