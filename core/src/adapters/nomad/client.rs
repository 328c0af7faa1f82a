//! Nomad HTTP API client.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::models::{Allocation, AllocationStub};
use crate::config::NomadClientConfig;
use crate::domain::{EndpointRecord, NomadTask};
use crate::error::{Error, Result};
use crate::ports::EndpointCatalog;

/// Timeout for a single Nomad API request.
const NOMAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Looks up task endpoints through the Nomad HTTP API.
#[derive(Debug, Clone)]
pub struct NomadClient {
    http: Client,
    base_url: Url,
}

impl NomadClient {
    /// Creates a client for the API described by `config`.
    pub fn new(config: &NomadClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url()).map_err(|e| {
            Error::Config(format!("Invalid Nomad address '{}': {}", config.address, e))
        })?;

        let http = Client::builder()
            .timeout(NOMAD_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create Nomad client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Invalid Nomad base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(url = %url, "Querying Nomad");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Resolution(format!("Nomad request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Resolution(format!(
                "Nomad returned {} for {}",
                status, url
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Resolution(format!("Invalid Nomad response from {}: {}", url, e)))
    }
}

impl EndpointCatalog for NomadClient {
    async fn endpoints(&self, task: &NomadTask) -> Result<Vec<EndpointRecord>> {
        let stubs: Vec<AllocationStub> = self
            .get_json(self.url(&["v1", "job", &task.job, "allocations"])?)
            .await?;

        let mut records = Vec::new();
        for stub in stubs.iter().filter(|s| s.is_running_in(&task.group)) {
            let allocation: Allocation = self
                .get_json(self.url(&["v1", "allocation", &stub.id])?)
                .await?;

            if let Some(record) = allocation.endpoint_record(&task.task) {
                records.push(record);
            }
        }

        debug!(
            service = %task,
            allocations = stubs.len(),
            endpoints = records.len(),
            "Resolved Nomad endpoints"
        );

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building_escapes_segments() {
        let client = NomadClient::new(&NomadClientConfig::new("localhost")).unwrap();
        let url = client.url(&["v1", "job", "my job", "allocations"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:4646/v1/job/my%20job/allocations");
    }

    #[test]
    fn test_invalid_address_is_config_error() {
        let result = NomadClient::new(&NomadClientConfig::new("http://bad host"));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
