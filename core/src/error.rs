//! Error types for the ingress-core library.

use thiserror::Error;

/// Result type alias for ingress operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring, resolving or running a forward.
#[derive(Error, Debug)]
pub enum Error {
    /// A port mapping string was malformed.
    #[error("Invalid port mapping '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// The configuration does not fit the selected backend.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The service reference could not be resolved.
    #[error("Failed to resolve service: {0}")]
    Resolution(String),

    /// The resolver returned nothing usable for the requested port.
    #[error("No endpoints found for service {service} with port {port}")]
    NoEndpoints { service: String, port: String },

    /// A child process failed to launch or exited unsuccessfully.
    #[error("Process error: {0}")]
    Process(String),

    /// A child process wrote to its error stream while still running.
    #[error("Process reported an error: {0}")]
    StreamFailure(String),
}

impl Error {
    /// Returns true if the supervisor should back off and try again.
    ///
    /// Parse and configuration errors are operator mistakes and never retried.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Error::Parse { .. } | Error::Config(_))
    }

    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        Error::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
