use std::fmt;

use tracing::warn;

use crate::error::ControllerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Load,
    Add,
    Toggle,
    Delete,
    Reorder,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Add => "add",
            Self::Toggle => "toggle",
            Self::Delete => "delete",
            Self::Reorder => "reorder",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives failures of remote calls made by the controller. Failures are
/// never shown to the user directly; they end up here.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, operation: Operation, error: &ControllerError);
}

/// Default sink: one `warn` event per failure.
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, operation: Operation, error: &ControllerError) {
        warn!(operation = %operation, error = %error, "tasks: remote call failed");
    }
}
