//! Failure-monitoring runner for forwarding processes.
//!
//! A forward is considered failed when either:
//! - the child process exits (any status, including a launch error), or
//! - under `FailurePolicy::ExitOrErrorOutput`, the child writes a line to its
//!   error stream while still running.
//!
//! Both conditions are raced; whichever is observed first decides the
//! outcome. When the error stream wins, the child is killed before the
//! runner returns. A clean exit only succeeds once the drained error stream
//! is known to be empty.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::levels::{infer_level, LineLevel};
use crate::domain::{FailurePolicy, ProxyCommand};
use crate::error::{Error, Result};
use crate::ports::ProcessLauncher;

/// Buffered failure signals; only the first one is ever consumed.
const FAILURE_CHANNEL_CAPACITY: usize = 16;

/// How long to let the output drains flush after the child is gone.
///
/// socat forks per connection and the forks inherit the pipes, so EOF is
/// not guaranteed once the parent exits.
const DRAIN_GRACE_PERIOD: Duration = Duration::from_millis(250);

/// Log target for lines written to a child's error stream.
const STDERR_TARGET: &str = "ingress::stderr";

/// Runs forwarding processes and watches their output for failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Creates a new runner.
    pub fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for ProcessRunner {
    async fn launch(&self, command: ProxyCommand) -> Result<()> {
        run_monitored(command).await
    }
}

enum Outcome {
    Exited(std::io::Result<ExitStatus>),
    ErrorOutput(String),
}

/// Runs `command` until it exits or, depending on its policy, reports an
/// error on stderr.
pub async fn run_monitored(command: ProxyCommand) -> Result<()> {
    let mut child = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            Error::Process(format!(
                "Failed to start {}: {}",
                command.program.display(),
                e
            ))
        })?;

    info!(
        label = %command.label,
        pid = ?child.id(),
        command = %command,
        "Started forwarding process"
    );

    let (failure_tx, mut failure_rx) = mpsc::channel::<String>(FAILURE_CHANNEL_CAPACITY);
    let failure_tx = match command.failure_policy {
        FailurePolicy::ExitOrErrorOutput => Some(failure_tx),
        FailurePolicy::ExitOnly => None,
    };

    let mut drains = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        drains.push(tokio::spawn(drain_stdout(stdout, command.label.clone())));
    }
    if let Some(stderr) = child.stderr.take() {
        drains.push(tokio::spawn(drain_stderr(
            stderr,
            command.label.clone(),
            failure_tx,
        )));
    }

    let outcome = tokio::select! {
        biased;
        Some(line) = failure_rx.recv() => Outcome::ErrorOutput(line),
        status = child.wait() => Outcome::Exited(status),
    };

    if let Outcome::ErrorOutput(_) = &outcome {
        warn!(
            label = %command.label,
            pid = ?child.id(),
            "Forwarding process reported an error, terminating"
        );
        terminate(&mut child, &command.label).await;
    }

    finish_drains(drains).await;

    match outcome {
        Outcome::ErrorOutput(line) => Err(Error::StreamFailure(line)),
        Outcome::Exited(Ok(status)) if status.success() => {
            // The exit can be observed before the drain forwards a line
            // written just before it.
            if let Ok(line) = failure_rx.try_recv() {
                warn!(label = %command.label, "Forwarding process exited after reporting an error");
                return Err(Error::StreamFailure(line));
            }
            info!(label = %command.label, "Forwarding process exited");
            Ok(())
        }
        Outcome::Exited(Ok(status)) => Err(Error::Process(format!(
            "{} exited with {}",
            command.label, status
        ))),
        Outcome::Exited(Err(e)) => Err(Error::Process(format!(
            "Failed to wait for {}: {}",
            command.label, e
        ))),
    }
}

/// Kills the child and reaps it so no process outlives the runner.
async fn terminate(child: &mut Child, label: &str) {
    match child.kill().await {
        Ok(()) => debug!(label = %label, "Forwarding process killed"),
        Err(e) => debug!(label = %label, error = %e, "Kill failed, process may be gone"),
    }
}

async fn finish_drains(drains: Vec<JoinHandle<()>>) {
    for mut handle in drains {
        if timeout(DRAIN_GRACE_PERIOD, &mut handle).await.is_err() {
            handle.abort();
        }
    }
}

/// Calls `on_line` for every line of `stream` until EOF.
///
/// Bytes that are not UTF-8 are replaced rather than ending the read; a
/// closed pipe would kill the child on its next write.
async fn for_each_line<R, F>(stream: R, mut on_line: F)
where
    R: AsyncRead + Unpin,
    F: FnMut(String),
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                on_line(line.trim_end_matches(&['\n', '\r'][..]).to_string());
            }
        }
    }
}

async fn drain_stdout<R>(stream: R, label: String)
where
    R: AsyncRead + Unpin,
{
    for_each_line(stream, |line| info!(label = %label, "{}", line)).await;
}

async fn drain_stderr<R>(stream: R, label: String, failure_tx: Option<mpsc::Sender<String>>)
where
    R: AsyncRead + Unpin,
{
    for_each_line(stream, |line| match &failure_tx {
        Some(tx) => {
            error!(target: STDERR_TARGET, label = %label, "{}", line);
            // A full channel already holds a failure; the runner only needs one.
            let _ = tx.try_send(line);
        }
        None => match infer_level(&line) {
            LineLevel::Error => error!(target: STDERR_TARGET, label = %label, "{}", line),
            LineLevel::Warn => warn!(target: STDERR_TARGET, label = %label, "{}", line),
            LineLevel::Info => info!(target: STDERR_TARGET, label = %label, "{}", line),
            LineLevel::Debug => debug!(target: STDERR_TARGET, label = %label, "{}", line),
        },
    })
    .await;
}
