//! Test doubles shared by the backend tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::{EndpointRecord, NomadTask, ProxyCommand};
use crate::error::{Error, Result};
use crate::ports::{EndpointCatalog, ProcessLauncher};

/// Scripted outcome for a fake launch.
#[derive(Debug, Clone)]
pub enum Script {
    Succeed,
    Fail(&'static str),
    ErrorOutput(&'static str),
    Pending,
}

/// Records launched commands and plays back scripted outcomes.
///
/// A script applies to any command with an argument equal to its key;
/// unscripted commands succeed.
#[derive(Clone, Default)]
pub struct FakeLauncher {
    launched: Arc<Mutex<Vec<ProxyCommand>>>,
    scripts: Arc<HashMap<String, Script>>,
    cancelled: Arc<AtomicUsize>,
}

impl FakeLauncher {
    pub fn script(mut self, arg: &str, script: Script) -> Self {
        Arc::make_mut(&mut self.scripts).insert(arg.to_string(), script);
        self
    }

    pub fn launched(&self) -> Vec<ProxyCommand> {
        self.launched.lock().clone()
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }
}

struct CancelGuard(Arc<AtomicUsize>);

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl ProcessLauncher for FakeLauncher {
    async fn launch(&self, command: ProxyCommand) -> Result<()> {
        let script = command
            .args
            .iter()
            .find_map(|arg| self.scripts.get(arg))
            .cloned()
            .unwrap_or(Script::Succeed);
        self.launched.lock().push(command);

        match script {
            Script::Succeed => Ok(()),
            Script::Fail(msg) => Err(Error::Process(msg.to_string())),
            Script::ErrorOutput(line) => Err(Error::StreamFailure(line.to_string())),
            Script::Pending => {
                let _guard = CancelGuard(self.cancelled.clone());
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }
}

/// Serves a fixed set of endpoint records and counts lookups.
#[derive(Clone, Default)]
pub struct FakeCatalog {
    records: Arc<Vec<EndpointRecord>>,
    failure: Option<&'static str>,
    calls: Arc<AtomicUsize>,
}

impl FakeCatalog {
    pub fn with_records(records: Vec<EndpointRecord>) -> Self {
        Self {
            records: Arc::new(records),
            ..Self::default()
        }
    }

    pub fn failing(message: &'static str) -> Self {
        Self {
            failure: Some(message),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EndpointCatalog for FakeCatalog {
    async fn endpoints(&self, _task: &NomadTask) -> Result<Vec<EndpointRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure {
            Some(message) => Err(Error::Resolution(message.to_string())),
            None => Ok(self.records.as_ref().clone()),
        }
    }
}

/// Builds an endpoint record from `(label, address)` pairs.
pub fn record(ports: &[(&str, &str)]) -> EndpointRecord {
    ports
        .iter()
        .map(|(label, address)| (label.to_string(), address.to_string()))
        .collect()
}
