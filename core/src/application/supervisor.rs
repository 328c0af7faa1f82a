//! Supervisor loop.
//!
//! Runs the selected backend over and over. In `RunMode::AlwaysOn` every
//! ending of the forward (failure or clean exit) is followed by a fixed
//! delay and another attempt, without limit; only parse and configuration
//! errors stop the loop. In `RunMode::OneShot` the first result is final.

use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::{IngressConfig, RunMode};
use crate::domain::{display_mappings, BackendKind, PortMapping};
use crate::error::Result;
use crate::ports::ForwardBackend;

/// Drives a backend according to the run mode.
pub struct Supervisor<B: ForwardBackend> {
    backend: B,
    kind: BackendKind,
    service: String,
    mappings: Vec<PortMapping>,
    mode: RunMode,
    retry_delay: Duration,
}

impl<B: ForwardBackend> Supervisor<B> {
    /// Creates a supervisor for `backend` using the service, mappings and
    /// retry settings from `config`.
    pub fn new(backend: B, config: &IngressConfig) -> Self {
        Self {
            backend,
            kind: config.backend,
            service: config.service.clone(),
            mappings: config.mappings.clone(),
            mode: config.mode,
            retry_delay: config.retry_delay,
        }
    }

    /// Runs the forward.
    ///
    /// Always-on mode only returns on a non-retryable error.
    pub async fn run(&self) -> Result<()> {
        let mappings = display_mappings(&self.mappings);
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;
            info!(
                backend = %self.kind,
                service = %self.service,
                mappings = %mappings,
                attempt,
                "Starting ingress"
            );

            let result = self.backend.run(&self.service, &self.mappings).await;

            match (&result, self.mode) {
                (_, RunMode::OneShot) => return result,
                (Err(e), RunMode::AlwaysOn) if !e.is_retryable() => {
                    error!(
                        backend = %self.kind,
                        service = %self.service,
                        mappings = %mappings,
                        error = %e,
                        "Unrecoverable ingress error"
                    );
                    return result;
                }
                (Err(e), RunMode::AlwaysOn) => {
                    error!(
                        backend = %self.kind,
                        service = %self.service,
                        mappings = %mappings,
                        error = %e,
                        retry_in = ?self.retry_delay,
                        "Error creating connection, retrying"
                    );
                }
                (Ok(()), RunMode::AlwaysOn) => {
                    warn!(
                        backend = %self.kind,
                        service = %self.service,
                        mappings = %mappings,
                        retry_in = ?self.retry_delay,
                        "Forwarding process ended, restarting"
                    );
                }
            }

            tokio::time::sleep(self.retry_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use tokio::time::Instant;

    /// Backend that replays scripted results and records each call.
    #[derive(Clone, Default)]
    struct ScriptedBackend {
        results: Arc<Mutex<VecDeque<Result<()>>>>,
        calls: Arc<Mutex<Vec<(Instant, String, Vec<PortMapping>)>>>,
    }

    impl ScriptedBackend {
        fn with_results(results: Vec<Result<()>>) -> Self {
            Self {
                results: Arc::new(Mutex::new(results.into())),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<(Instant, String, Vec<PortMapping>)> {
            self.calls.lock().clone()
        }
    }

    impl ForwardBackend for ScriptedBackend {
        async fn run(&self, service: &str, mappings: &[PortMapping]) -> Result<()> {
            self.calls
                .lock()
                .push((Instant::now(), service.to_string(), mappings.to_vec()));
            self.results
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(Error::Process("exit status: 1".into())))
        }
    }

    fn config(mode: RunMode) -> IngressConfig {
        IngressConfig::new(BackendKind::Local, "app.internal", &["8081:8080", "9090:9090"])
            .unwrap()
            .with_mode(mode)
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_on_retries_every_two_seconds() {
        let backend = ScriptedBackend::default();
        let supervisor = Supervisor::new(backend.clone(), &config(RunMode::AlwaysOn));

        let outcome = tokio::time::timeout(Duration::from_millis(6500), supervisor.run()).await;
        assert!(outcome.is_err(), "always-on supervisor must not return");

        let calls = backend.calls();
        assert_eq!(calls.len(), 4);
        for pair in calls.windows(2) {
            let gap = pair[1].0 - pair[0].0;
            assert!(gap >= Duration::from_secs(2) && gap < Duration::from_millis(2100));
        }
        for (_, service, mappings) in &calls {
            assert_eq!(service, "app.internal");
            assert_eq!(
                mappings,
                &vec![PortMapping::new("8081", "8080"), PortMapping::new("9090", "9090")]
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_on_restarts_after_clean_exit() {
        let backend = ScriptedBackend::with_results(vec![Ok(()), Ok(())]);
        let supervisor = Supervisor::new(backend.clone(), &config(RunMode::AlwaysOn));

        let outcome = tokio::time::timeout(Duration::from_millis(4500), supervisor.run()).await;
        assert!(outcome.is_err());
        assert_eq!(backend.calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_on_stops_on_config_error() {
        let backend = ScriptedBackend::with_results(vec![
            Err(Error::StreamFailure("connection refused".into())),
            Err(Error::Config("only 1 port mapping supported".into())),
        ]);
        let supervisor = Supervisor::new(backend.clone(), &config(RunMode::AlwaysOn));

        let result = supervisor.run().await;
        assert!(matches!(result, Err(Error::Config(_))));
        assert_eq!(backend.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_shot_returns_first_failure() {
        let backend = ScriptedBackend::with_results(vec![Err(Error::NoEndpoints {
            service: "api.web.app".into(),
            port: "http".into(),
        })]);
        let supervisor = Supervisor::new(backend.clone(), &config(RunMode::OneShot));

        let result = supervisor.run().await;
        assert!(matches!(result, Err(Error::NoEndpoints { .. })));
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_shot_returns_success() {
        let backend = ScriptedBackend::with_results(vec![Ok(())]);
        let supervisor = Supervisor::new(backend.clone(), &config(RunMode::OneShot));

        assert!(supervisor.run().await.is_ok());
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_retry_delay() {
        let backend = ScriptedBackend::default();
        let config = config(RunMode::AlwaysOn).with_retry_delay(Duration::from_secs(5));
        let supervisor = Supervisor::new(backend.clone(), &config);

        let _ = tokio::time::timeout(Duration::from_secs(11), supervisor.run()).await;
        assert_eq!(backend.calls().len(), 3);
    }
}
