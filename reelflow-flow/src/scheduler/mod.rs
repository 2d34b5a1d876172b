//! Scheduler layer
//!
//! Polls remote job-status endpoints on a fixed interval and hands the
//! snapshots to callers through callbacks, a channel, or a waitable handle.

pub mod poller;

pub use poller::{JobPoller, PollHandle, PollWaiter};
