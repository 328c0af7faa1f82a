//! Ingress CLI - Stable local endpoints for remote services
//!
//! Forwards local TCP ports to a service on a Docker network, in a
//! Kubernetes cluster or in a Nomad cluster, and keeps the forward alive.

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use ingress_core::adapters::Executables;
use ingress_core::{Backend, BackendKind, IngressConfig, RunMode, Supervisor};
use tokio::signal;
use tracing::{error, info};

use logging::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "ingress")]
#[command(author, version, about = "Expose a Docker, Kubernetes or Nomad service on local ports")]
struct Cli {
    /// Port mappings to forward, as local:remote (repeat or comma-separate)
    #[arg(short, long = "ports", env = "INGRESS_PORTS", value_delimiter = ',', required = true)]
    ports: Vec<String>,

    /// Service to forward to: an FQDN, a pod/service name, or job.group.task for Nomad
    #[arg(short, long, env = "INGRESS_SERVICE")]
    service: String,

    /// Backend used to reach the service (local, kubernetes, nomad)
    #[arg(short, long, env = "INGRESS_BACKEND", default_value = "local")]
    backend: BackendKind,

    /// Kubernetes namespace
    #[arg(
        short,
        long,
        env = "INGRESS_NAMESPACE",
        default_value = ingress_core::config::DEFAULT_NAMESPACE
    )]
    namespace: String,

    /// Nomad client config file [default: ~/.ingress/nomad.json]
    #[arg(long, env = "INGRESS_NOMAD_CONFIG")]
    nomad_config: Option<PathBuf>,

    /// Run the forward once instead of restarting it forever
    #[arg(long, env = "INGRESS_ONCE")]
    once: bool,

    /// Seconds to wait before restarting a forward
    #[arg(
        long,
        env = "INGRESS_RETRY_DELAY",
        default_value_t = 2,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    retry_delay: u64,

    /// Path to the socat binary
    #[arg(long, env = "INGRESS_SOCAT")]
    socat: Option<PathBuf>,

    /// Path to the kubectl binary
    #[arg(long, env = "INGRESS_KUBECTL")]
    kubectl: Option<PathBuf>,

    /// Log output format
    #[arg(long, env = "INGRESS_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

impl Cli {
    /// Builds the immutable run configuration.
    fn into_config(self) -> ingress_core::Result<IngressConfig> {
        let mut config = IngressConfig::new(self.backend, self.service, &self.ports)?
            .with_namespace(self.namespace)
            .with_retry_delay(Duration::from_secs(self.retry_delay))
            .with_executables(Executables::with_overrides(self.socat, self.kubectl));

        if let Some(path) = self.nomad_config {
            config = config.with_nomad_config_path(path);
        }
        if self.once {
            config = config.with_mode(RunMode::OneShot);
        }

        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_format);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    info!("Starting Ingress");

    let config = cli.into_config().context("Invalid configuration")?;
    let backend = Backend::from_config(&config)
        .await
        .with_context(|| format!("Failed to set up {} backend", config.backend))?;
    let supervisor = Supervisor::new(backend, &config);

    // Dropping the supervisor on shutdown kills any running forward.
    tokio::select! {
        result = supervisor.run() => result.with_context(|| {
            format!("Error creating connection to {}", config.service)
        })?,
        _ = shutdown_signal() => info!("Shutdown signal received"),
    }

    info!("Ingress stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
