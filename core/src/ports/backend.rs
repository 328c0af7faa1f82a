//! Forwarding backend port (interface).

use crate::domain::PortMapping;
use crate::error::Result;

/// Port for "forward these mappings to this service".
///
/// Always-on implementations block until the forward ends or fails; the
/// supervisor decides whether to call again.
pub trait ForwardBackend: Send + Sync {
    /// Forward `mappings` to `service` until the underlying process ends.
    fn run(
        &self,
        service: &str,
        mappings: &[PortMapping],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
