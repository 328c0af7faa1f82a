//! Service references and resolved endpoints.

use std::fmt;

use crate::error::{Error, Result};

// ============================================================================
// NomadTask
// ============================================================================

/// A Nomad task addressed as `job.group.task`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NomadTask {
    pub job: String,
    pub group: String,
    pub task: String,
}

impl NomadTask {
    /// Parses a `job.group.task` reference.
    ///
    /// Exactly three non-empty dot-separated components are required.
    pub fn parse(reference: &str) -> Result<Self> {
        let parts: Vec<&str> = reference.split('.').collect();

        if parts.len() != 3 {
            return Err(Error::Resolution(format!(
                "service reference '{}' must be in the format job.group.task",
                reference
            )));
        }

        if parts.iter().any(|p| p.is_empty()) {
            return Err(Error::Resolution(format!(
                "service reference '{}' has an empty component",
                reference
            )));
        }

        Ok(Self {
            job: parts[0].to_string(),
            group: parts[1].to_string(),
            task: parts[2].to_string(),
        })
    }
}

impl fmt::Display for NomadTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.job, self.group, self.task)
    }
}

// ============================================================================
// Endpoint
// ============================================================================

/// Port label (or number) to `address:port` for one running allocation.
pub type EndpointRecord = std::collections::HashMap<String, String>;

/// A reachable address and port for a resolved service instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub address: String,
    pub port: String,
}

impl Endpoint {
    /// Splits an `address:port` value on its last colon.
    ///
    /// Splitting on the last colon keeps bracketed IPv6 hosts intact.
    pub fn from_host_port(value: &str) -> Result<Self> {
        let (address, port) = value.rsplit_once(':').ok_or_else(|| {
            Error::Resolution(format!("endpoint '{}' is not in the format host:port", value))
        })?;

        if address.is_empty() || port.is_empty() {
            return Err(Error::Resolution(format!(
                "endpoint '{}' is not in the format host:port",
                value
            )));
        }

        Ok(Self {
            address: address.to_string(),
            port: port.to_string(),
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nomad_task() {
        let task = NomadTask::parse("cache.redis.server").unwrap();
        assert_eq!(task.job, "cache");
        assert_eq!(task.group, "redis");
        assert_eq!(task.task, "server");
        assert_eq!(task.to_string(), "cache.redis.server");
    }

    #[test]
    fn test_parse_nomad_task_rejects_wrong_component_count() {
        for reference in ["", "job", "job.group", "a.b.c.d", "web.internal.svc.cluster"] {
            assert!(
                matches!(NomadTask::parse(reference), Err(Error::Resolution(_))),
                "expected resolution error for {:?}",
                reference
            );
        }
    }

    #[test]
    fn test_parse_nomad_task_rejects_empty_component() {
        assert!(matches!(NomadTask::parse("job..task"), Err(Error::Resolution(_))));
        assert!(matches!(NomadTask::parse(".group.task"), Err(Error::Resolution(_))));
    }

    #[test]
    fn test_endpoint_splits_on_last_colon() {
        let endpoint = Endpoint::from_host_port("10.0.0.4:23456").unwrap();
        assert_eq!(endpoint.address, "10.0.0.4");
        assert_eq!(endpoint.port, "23456");

        let v6 = Endpoint::from_host_port("[::1]:8080").unwrap();
        assert_eq!(v6.address, "[::1]");
        assert_eq!(v6.port, "8080");
    }

    #[test]
    fn test_endpoint_rejects_missing_port() {
        assert!(Endpoint::from_host_port("10.0.0.4").is_err());
        assert!(Endpoint::from_host_port("10.0.0.4:").is_err());
    }
}
