//! Job status endpoints

use reelflow_core::domain::job::JobKind;
use reqwest::Method;
use serde::Serialize;
use tracing::debug;

use crate::StudioClient;
use crate::error::{ClientError, Result};
use reelflow_core::dto::status::StatusReport;

/// Body of the script-generation status request
#[derive(Debug, Serialize)]
struct ScriptStatusRequest<'a> {
    job_id: &'a str,
}

/// Where and how the status of a job is requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRoute {
    pub method: Method,
    /// Path relative to the base URL
    pub path: String,
    /// Whether the job id travels in a JSON body instead of the path
    pub job_id_in_body: bool,
}

impl StatusRoute {
    /// Route of the status endpoint for a job kind
    pub fn for_job(kind: JobKind, job_id: &str) -> Self {
        match kind {
            JobKind::Images => Self::get(format!("/api/images/status/{}", job_id)),
            JobKind::Videos => Self::get(format!("/api/videos/status/{}", job_id)),
            JobKind::Merge => Self::get(format!("/api/videos/merge/status/{}", job_id)),
            JobKind::ScriptGeneration => Self {
                method: Method::POST,
                path: "/api/script/status".to_string(),
                job_id_in_body: true,
            },
        }
    }

    fn get(path: String) -> Self {
        Self {
            method: Method::GET,
            path,
            job_id_in_body: false,
        }
    }
}

impl StudioClient {
    // =============================================================================
    // Job Status
    // =============================================================================

    /// Fetch the current status of a job
    ///
    /// # Arguments
    /// * `kind` - The job kind, which selects the endpoint
    /// * `job_id` - The opaque job identifier issued by the backend
    ///
    /// # Returns
    /// The parsed status report. A 2xx body that is not JSON is returned as an
    /// opaque result instead of an error.
    pub async fn fetch_status(&self, kind: JobKind, job_id: &str) -> Result<StatusReport> {
        if job_id.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "job id must not be empty".to_string(),
            ));
        }

        let route = StatusRoute::for_job(kind, job_id);
        let url = format!("{}{}", self.base_url, route.path);
        debug!("Fetching {} status for job {} from {}", kind, job_id, url);

        let mut request = self.authorize(self.client.request(route.method, &url));
        if route.job_id_in_body {
            request = request.json(&ScriptStatusRequest { job_id });
        }

        let response = request.send().await?;
        let body = self.handle_text_response(response).await?;

        Ok(StatusReport::from_body(kind, &body))
    }
}
