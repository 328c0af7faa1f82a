//! Process launcher port (interface).

use crate::domain::ProxyCommand;
use crate::error::Result;

/// Port for running a forwarding child process to completion.
///
/// Implementations must not leave the child running once the returned
/// future has resolved or been dropped.
pub trait ProcessLauncher: Send + Sync {
    /// Run the command until it exits or reports a failure.
    ///
    /// Returns `Ok(())` only when the process exited successfully without a
    /// failure signal.
    fn launch(&self, command: ProxyCommand)
        -> impl std::future::Future<Output = Result<()>> + Send;
}
