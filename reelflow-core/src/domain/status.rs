//! Job status and the synonym table used to normalize remote status strings

use serde::{Deserialize, Serialize};

/// Status of a remote generation job as tracked by the client
///
/// Variants are ordered: a job only ever moves towards the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    Succeeded,
    Failed,
}

/// Every status string the backend is known to emit, after normalization
///
/// The endpoints disagree on wording, so new synonyms go here and nowhere else.
pub const STATUS_SYNONYMS: &[(&str, JobStatus)] = &[
    ("queued", JobStatus::Queued),
    ("pending", JobStatus::Queued),
    ("waiting", JobStatus::Queued),
    ("submitted", JobStatus::Queued),
    ("created", JobStatus::Queued),
    ("scheduled", JobStatus::Queued),
    ("processing", JobStatus::Processing),
    ("in_progress", JobStatus::Processing),
    ("running", JobStatus::Processing),
    ("started", JobStatus::Processing),
    ("generating", JobStatus::Processing),
    ("rendering", JobStatus::Processing),
    ("succeeded", JobStatus::Succeeded),
    ("success", JobStatus::Succeeded),
    ("completed", JobStatus::Succeeded),
    ("complete", JobStatus::Succeeded),
    ("done", JobStatus::Succeeded),
    ("finished", JobStatus::Succeeded),
    ("ready", JobStatus::Succeeded),
    ("failed", JobStatus::Failed),
    ("failure", JobStatus::Failed),
    ("error", JobStatus::Failed),
    ("errored", JobStatus::Failed),
    ("cancelled", JobStatus::Failed),
    ("canceled", JobStatus::Failed),
    ("timed_out", JobStatus::Failed),
];

impl JobStatus {
    /// Maps a raw status string onto the closed status set
    ///
    /// Matching ignores case and surrounding whitespace, and treats `-` and
    /// spaces like `_` (`"In Progress"`, `"in-progress"` and `"IN_PROGRESS"`
    /// are the same). Returns `None` for strings not in [`STATUS_SYNONYMS`].
    pub fn normalize(raw: &str) -> Option<JobStatus> {
        let key: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        STATUS_SYNONYMS
            .iter()
            .find(|(synonym, _)| *synonym == key)
            .map(|(_, status)| *status)
    }

    /// Whether polling stops at this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "Queued"),
            JobStatus::Processing => write!(f, "Processing"),
            JobStatus::Succeeded => write!(f, "Succeeded"),
            JobStatus::Failed => write!(f, "Failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_synonym() {
        let expected = [
            ("queued", JobStatus::Queued),
            ("pending", JobStatus::Queued),
            ("waiting", JobStatus::Queued),
            ("submitted", JobStatus::Queued),
            ("created", JobStatus::Queued),
            ("scheduled", JobStatus::Queued),
            ("processing", JobStatus::Processing),
            ("in_progress", JobStatus::Processing),
            ("running", JobStatus::Processing),
            ("started", JobStatus::Processing),
            ("generating", JobStatus::Processing),
            ("rendering", JobStatus::Processing),
            ("succeeded", JobStatus::Succeeded),
            ("success", JobStatus::Succeeded),
            ("completed", JobStatus::Succeeded),
            ("complete", JobStatus::Succeeded),
            ("done", JobStatus::Succeeded),
            ("finished", JobStatus::Succeeded),
            ("ready", JobStatus::Succeeded),
            ("failed", JobStatus::Failed),
            ("failure", JobStatus::Failed),
            ("error", JobStatus::Failed),
            ("errored", JobStatus::Failed),
            ("cancelled", JobStatus::Failed),
            ("canceled", JobStatus::Failed),
            ("timed_out", JobStatus::Failed),
        ];

        assert_eq!(expected.len(), STATUS_SYNONYMS.len());
        for (raw, status) in expected {
            assert_eq!(JobStatus::normalize(raw), Some(status), "synonym {raw}");
        }
    }

    #[test]
    fn test_normalize_is_case_insensitive() {
        assert_eq!(JobStatus::normalize("COMPLETED"), Some(JobStatus::Succeeded));
        assert_eq!(JobStatus::normalize("Succeeded"), Some(JobStatus::Succeeded));
        assert_eq!(JobStatus::normalize("  Error "), Some(JobStatus::Failed));
    }

    #[test]
    fn test_normalize_separators() {
        assert_eq!(JobStatus::normalize("in-progress"), Some(JobStatus::Processing));
        assert_eq!(JobStatus::normalize("In Progress"), Some(JobStatus::Processing));
        assert_eq!(JobStatus::normalize("timed-out"), Some(JobStatus::Failed));
    }

    #[test]
    fn test_normalize_unknown() {
        assert_eq!(JobStatus::normalize("exploded"), None);
        assert_eq!(JobStatus::normalize(""), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_order_is_forward() {
        assert!(JobStatus::Queued < JobStatus::Processing);
        assert!(JobStatus::Processing < JobStatus::Succeeded);
    }
}
