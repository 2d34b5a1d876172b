//! Error types for the flow layer

use reelflow_core::CoreError;
use reelflow_core::domain::wizard::WizardStep;
use thiserror::Error;

use crate::session::StoreError;

/// Errors raised by the poller, the wizard and their configuration
#[derive(Debug, Error)]
pub enum FlowError {
    /// A domain value was rejected (e.g. an empty job id)
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The session store could not be read or written
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A step was awaited without a job attached to it
    #[error("no job attached to step {0}")]
    NoJobAttached(WizardStep),
}
