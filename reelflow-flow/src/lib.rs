//! Reelflow Flow
//!
//! Client-side orchestration for the video-generation backend.
//!
//! Architecture:
//! - Configuration: poll interval, redirect delay and store location
//! - Scheduler: fixed-interval job polling with cancellable handles
//! - Session: explicit key-value context persisted between runs
//! - Wizard: the step holder that attaches jobs and decides what follows them
//!
//! Remote failures never escape as errors from a running poll; they arrive as
//! terminal `Failed` snapshots.

pub mod config;
pub mod error;
pub mod scheduler;
pub mod session;
pub mod wizard;

pub use config::FlowConfig;
pub use error::FlowError;
pub use scheduler::{JobPoller, PollHandle, PollWaiter};
pub use session::{JsonFileStore, MemoryStore, SessionContext, SessionStore};
pub use wizard::{StepOutcome, StepWizard};
