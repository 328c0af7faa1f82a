//! Child process invocations.

use std::fmt;
use std::path::PathBuf;

/// How the runner interprets a child's error stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FailurePolicy {
    /// Only the process exiting ends the run. Error-stream lines are logged
    /// at a level inferred from their content.
    #[default]
    ExitOnly,
    /// Any error-stream line is also a failure signal. Used for kubectl,
    /// which keeps running (and may exit 0) while the tunnel is broken.
    ExitOrErrorOutput,
}

/// A fully built child process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyCommand {
    /// Executable to run.
    pub program: PathBuf,
    /// Arguments, in order.
    pub args: Vec<String>,
    /// How error output is treated.
    pub failure_policy: FailurePolicy,
    /// Short name used in log output (e.g. "socat 8081:8080").
    pub label: String,
}

impl ProxyCommand {
    /// Creates a command with the default `ExitOnly` policy.
    pub fn new(program: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            failure_policy: FailurePolicy::ExitOnly,
            label: label.into(),
        }
    }

    /// Appends an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the failure policy.
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

impl fmt::Display for ProxyCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
