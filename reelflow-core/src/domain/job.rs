//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::progress::{Progress, ProgressTracker};
use crate::domain::status::JobStatus;
use crate::dto::status::StatusReport;
use crate::error::CoreError;

/// Kind of remote generation job
///
/// The kind selects the status endpoint and the field that carries the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Images,
    Videos,
    Merge,
    ScriptGeneration,
}

impl JobKind {
    /// Stable snake_case name, used in session keys and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Images => "images",
            JobKind::Videos => "videos",
            JobKind::Merge => "merge",
            JobKind::ScriptGeneration => "script_generation",
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "images" | "image" => Ok(JobKind::Images),
            "videos" | "video" => Ok(JobKind::Videos),
            "merge" | "final_video" => Ok(JobKind::Merge),
            "script_generation" | "script" => Ok(JobKind::ScriptGeneration),
            _ => Err(CoreError::UnknownKind(s.to_string())),
        }
    }
}

/// Result of a successful job; its shape depends on the [`JobKind`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ResultPayload {
    /// Generated images or video clips
    Urls(Vec<String>),
    /// Merged final video
    Url(String),
    /// Structured document, e.g. a generated script
    Document(serde_json::Value),
    /// Body that was not JSON, kept verbatim
    Raw(String),
}

impl ResultPayload {
    /// The single URL of a merge result
    pub fn url(&self) -> Option<&str> {
        match self {
            ResultPayload::Url(url) => Some(url),
            _ => None,
        }
    }

    /// The URL list of an images or videos result
    pub fn urls(&self) -> Option<&[String]> {
        match self {
            ResultPayload::Urls(urls) => Some(urls),
            _ => None,
        }
    }

    /// JSON form handed to the wizard as step payload
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ResultPayload::Urls(urls) => serde_json::json!(urls),
            ResultPayload::Url(url) => serde_json::json!(url),
            ResultPayload::Document(doc) => doc.clone(),
            ResultPayload::Raw(raw) => serde_json::json!(raw),
        }
    }
}

/// Point-in-time view of a job, handed to poll observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub job_id: String,
    pub kind: JobKind,
    pub status: JobStatus,
    pub progress: Option<Progress>,
    pub result: Option<ResultPayload>,
    pub error: Option<String>,
    pub observed_at: DateTime<Utc>,
}

impl JobSnapshot {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// One outstanding remote job
///
/// Folds successive status reports into a consistent view: status only moves
/// forward, terminal states are final, and surfaced progress never regresses.
#[derive(Debug, Clone)]
pub struct JobHandle {
    job_id: String,
    kind: JobKind,
    status: JobStatus,
    progress: Option<Progress>,
    result: Option<ResultPayload>,
    error: Option<String>,
    tracker: ProgressTracker,
}

impl JobHandle {
    /// Creates a handle in the `Queued` state
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyJobId`] if `job_id` is empty or whitespace.
    pub fn new(job_id: impl Into<String>, kind: JobKind) -> Result<Self, CoreError> {
        let job_id = job_id.into();
        if job_id.trim().is_empty() {
            return Err(CoreError::EmptyJobId);
        }

        Ok(Self {
            job_id,
            kind,
            status: JobStatus::Queued,
            progress: None,
            result: None,
            error: None,
            tracker: ProgressTracker::new(),
        })
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Folds a status report into the handle and returns the new snapshot
    ///
    /// Reports arriving after a terminal state are ignored.
    pub fn apply(&mut self, report: StatusReport) -> JobSnapshot {
        if self.is_terminal() {
            return self.snapshot();
        }

        self.status = self.status.max(report.status);

        if let Some(raw) = report.percent {
            let percent = self.tracker.observe(raw);
            let phase = report
                .phase
                .or_else(|| self.progress.as_ref().and_then(|p| p.phase.clone()));
            self.progress = Some(Progress { percent, phase });
        } else if let Some(phase) = report.phase {
            self.progress = Some(Progress {
                percent: self.tracker.current(),
                phase: Some(phase),
            });
        }

        match self.status {
            JobStatus::Succeeded => {
                let percent = self.tracker.complete();
                let phase = self.progress.take().and_then(|p| p.phase);
                self.progress = Some(Progress { percent, phase });
                self.result = report.result;
            }
            JobStatus::Failed => {
                self.error = Some(
                    report
                        .error
                        .unwrap_or_else(|| format!("{} job failed", self.kind)),
                );
            }
            JobStatus::Queued | JobStatus::Processing => {}
        }

        self.snapshot()
    }

    /// Moves the handle to `Failed` with the given message
    ///
    /// Used for transport-level failures where no report was received.
    pub fn fail(&mut self, message: impl Into<String>) -> JobSnapshot {
        if !self.is_terminal() {
            self.status = JobStatus::Failed;
            self.error = Some(message.into());
        }
        self.snapshot()
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            job_id: self.job_id.clone(),
            kind: self.kind,
            status: self.status,
            progress: self.progress.clone(),
            result: self.result.clone(),
            error: self.error.clone(),
            observed_at: Utc::now(),
        }
    }
}
