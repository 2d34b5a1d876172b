//! Error types for the core domain

use thiserror::Error;

/// Errors raised while building domain values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A job was created without an identifier
    #[error("job id must not be empty")]
    EmptyJobId,

    /// A wizard step name did not match any known step
    #[error("unknown wizard step: {0}")]
    UnknownStep(String),

    /// A job kind name did not match any known kind
    #[error("unknown job kind: {0}")]
    UnknownKind(String),
}
