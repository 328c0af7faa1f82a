//! Port mapping parsing.

use std::fmt;

use crate::error::{Error, Result};

// ============================================================================
// PortMapping
// ============================================================================

/// A single `local:remote` forwarding pair.
///
/// Both sides are opaque tokens: port numbers for the Local and Kubernetes
/// backends, port numbers or port labels for Nomad.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortMapping {
    /// Port (or address token) to listen on locally.
    pub local: String,
    /// Port (or label) on the remote service.
    pub remote: String,
}

impl PortMapping {
    /// Creates a mapping from its two halves.
    pub fn new(local: impl Into<String>, remote: impl Into<String>) -> Self {
        Self {
            local: local.into(),
            remote: remote.into(),
        }
    }

    /// Returns a copy of this mapping pointing at a different remote port.
    pub fn with_remote(&self, remote: impl Into<String>) -> Self {
        Self {
            local: self.local.clone(),
            remote: remote.into(),
        }
    }
}

impl std::str::FromStr for PortMapping {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let mut parts = trimmed.split(':');

        let (local, remote) = match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(remote), None) => (local, remote),
            (_, None, _) => return Err(Error::parse(s, "expected format local:remote")),
            _ => return Err(Error::parse(s, "more than one ':' separator")),
        };

        if local.is_empty() {
            return Err(Error::parse(s, "local side is empty"));
        }
        if remote.is_empty() {
            return Err(Error::parse(s, "remote side is empty"));
        }

        Ok(Self::new(local, remote))
    }
}

impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.local, self.remote)
    }
}

/// Parses an ordered list of `local:remote` strings.
///
/// The output keeps the input order; kubectl pairs local and remote ports
/// positionally, so entries are never sorted or deduplicated.
pub fn parse_port_mappings<S: AsRef<str>>(specs: &[S]) -> Result<Vec<PortMapping>> {
    specs.iter().map(|s| s.as_ref().parse()).collect()
}

/// Formats mappings for log output (e.g. "8081:8080,9090:9090").
pub fn display_mappings(mappings: &[PortMapping]) -> String {
    mappings
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
