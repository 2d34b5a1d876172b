//! Status source abstraction
//!
//! The poller only needs "give me the current status of this job". Keeping
//! that behind a trait lets it run against the HTTP client in production and
//! against scripted sources in tests.

use async_trait::async_trait;
use reelflow_core::domain::job::JobKind;
use reelflow_core::dto::status::StatusReport;

use crate::StudioClient;
use crate::error::Result;

/// Anything that can report the status of a remote job
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetches the current status of a job
    ///
    /// # Arguments
    /// * `kind` - The job kind
    /// * `job_id` - The opaque job identifier
    async fn fetch_status(&self, kind: JobKind, job_id: &str) -> Result<StatusReport>;
}

#[async_trait]
impl StatusSource for StudioClient {
    async fn fetch_status(&self, kind: JobKind, job_id: &str) -> Result<StatusReport> {
        StudioClient::fetch_status(self, kind, job_id).await
    }
}
