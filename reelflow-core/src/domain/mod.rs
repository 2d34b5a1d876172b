//! Core domain types
//!
//! This module contains the structures shared by the HTTP client, the poller
//! and the wizard. They describe remote jobs as the client sees them; the
//! backend owns the actual work.

pub mod job;
pub mod progress;
pub mod status;
pub mod wizard;
