//! Nomad API response models.
//!
//! Only the fields needed to locate a task's ports are modelled; Nomad
//! returns `null` for empty collections, so everything is optional.

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::EndpointRecord;

/// Entry of `GET /v1/job/:job/allocations`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AllocationStub {
    #[serde(rename = "ID")]
    pub id: String,
    pub task_group: String,
    pub client_status: String,
}

impl AllocationStub {
    /// Returns true if the allocation belongs to `group` and is running.
    pub fn is_running_in(&self, group: &str) -> bool {
        self.task_group == group && self.client_status == "running"
    }
}

/// Response of `GET /v1/allocation/:id`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Allocation {
    #[serde(rename = "ID")]
    pub id: String,
    pub task_group: String,
    #[serde(default)]
    pub allocated_resources: Option<AllocatedResources>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AllocatedResources {
    #[serde(default)]
    pub tasks: Option<HashMap<String, TaskResources>>,
    #[serde(default)]
    pub shared: Option<SharedResources>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskResources {
    #[serde(default)]
    pub networks: Option<Vec<NetworkResource>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SharedResources {
    #[serde(default)]
    pub networks: Option<Vec<NetworkResource>>,
    #[serde(default)]
    pub ports: Option<Vec<AllocatedPort>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkResource {
    #[serde(rename = "IP", default)]
    pub ip: String,
    #[serde(default)]
    pub reserved_ports: Option<Vec<Port>>,
    #[serde(default)]
    pub dynamic_ports: Option<Vec<Port>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Port {
    pub label: String,
    pub value: u16,
}

/// Group-level port with its host address.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AllocatedPort {
    pub label: String,
    pub value: u16,
    #[serde(rename = "HostIP", default)]
    pub host_ip: String,
}

impl Allocation {
    /// Builds the port label to `address:port` record for `task`.
    ///
    /// Returns `None` when the allocation does not run the task.
    pub fn endpoint_record(&self, task: &str) -> Option<EndpointRecord> {
        let resources = self.allocated_resources.as_ref()?;
        let task_resources = resources.tasks.as_ref()?.get(task)?;

        let mut record = EndpointRecord::new();

        let shared_networks = resources
            .shared
            .as_ref()
            .and_then(|s| s.networks.as_deref())
            .unwrap_or_default();
        let task_networks = task_resources.networks.as_deref().unwrap_or_default();

        for network in shared_networks.iter().chain(task_networks) {
            let ports = network
                .reserved_ports
                .iter()
                .flatten()
                .chain(network.dynamic_ports.iter().flatten());
            for port in ports {
                record.insert(port.label.clone(), format!("{}:{}", network.ip, port.value));
            }
        }

        let shared_ports = resources
            .shared
            .as_ref()
            .and_then(|s| s.ports.as_deref())
            .unwrap_or_default();
        for port in shared_ports {
            if !port.host_ip.is_empty() {
                record
                    .entry(port.label.clone())
                    .or_insert_with(|| format!("{}:{}", port.host_ip, port.value));
            }
        }

        Some(record)
    }
}
