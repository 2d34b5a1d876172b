//! Status report DTO
//!
//! The status endpoints are inconsistent: field names differ per job kind,
//! status strings come in many spellings, and progress is sometimes a number
//! and sometimes an object. [`StatusReport::from_body`] reads all of them into
//! a single shape.

use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::job::{JobKind, ResultPayload};
use crate::domain::status::JobStatus;

/// Field names carrying the result of a merge job, in priority order
const MERGE_RESULT_FIELDS: &[&str] = &["final_video_url", "video_url", "result_url"];

/// Field names carrying the asset list of an images job
const IMAGES_RESULT_FIELDS: &[&str] = &["images", "image_urls", "results"];

/// Field names carrying the asset list of a videos job
const VIDEOS_RESULT_FIELDS: &[&str] = &["videos", "video_urls", "results"];

/// Field names carrying a failure message
const ERROR_FIELDS: &[&str] = &["error", "error_message", "message", "detail"];

/// One parsed response from a status endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub status: JobStatus,
    /// Raw percent as reported, unclamped
    pub percent: Option<f64>,
    pub phase: Option<String>,
    pub result: Option<ResultPayload>,
    pub error: Option<String>,
}

impl StatusReport {
    /// Parses a response body for a job of the given kind
    ///
    /// Bodies that are not a JSON object are treated as an opaque successful
    /// result rather than an error.
    pub fn from_body(kind: JobKind, body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => Self::from_object(kind, &map),
            _ => Self {
                status: JobStatus::Succeeded,
                percent: None,
                phase: None,
                result: Some(ResultPayload::Raw(body.to_string())),
                error: None,
            },
        }
    }

    fn from_object(kind: JobKind, map: &Map<String, Value>) -> Self {
        let result = extract_result(kind, map);

        let status = match map
            .get("status")
            .or_else(|| map.get("state"))
            .and_then(Value::as_str)
        {
            Some(raw) => JobStatus::normalize(raw).unwrap_or_else(|| {
                warn!("Unrecognised {} job status {:?}, still polling", kind, raw);
                JobStatus::Processing
            }),
            None if result.is_some() => JobStatus::Succeeded,
            None => JobStatus::Processing,
        };

        let (percent, phase) = extract_progress(map);

        let error = if status == JobStatus::Failed {
            ERROR_FIELDS
                .iter()
                .filter_map(|field| map.get(*field))
                .find_map(message_of)
        } else {
            None
        };

        let result = match status {
            JobStatus::Succeeded => {
                Some(result.unwrap_or_else(|| ResultPayload::Document(Value::Object(map.clone()))))
            }
            _ => None,
        };

        Self {
            status,
            percent,
            phase,
            result,
            error,
        }
    }
}

fn extract_result(kind: JobKind, map: &Map<String, Value>) -> Option<ResultPayload> {
    match kind {
        JobKind::Merge => MERGE_RESULT_FIELDS
            .iter()
            .filter_map(|field| map.get(*field))
            .find_map(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(|url| ResultPayload::Url(url.to_string())),
        JobKind::Images => url_list(IMAGES_RESULT_FIELDS, map),
        JobKind::Videos => url_list(VIDEOS_RESULT_FIELDS, map),
        JobKind::ScriptGeneration => map.get("script").map(|s| ResultPayload::Document(s.clone())),
    }
}

fn url_list(fields: &[&str], map: &Map<String, Value>) -> Option<ResultPayload> {
    let items = fields
        .iter()
        .filter_map(|field| map.get(*field))
        .find_map(Value::as_array)?;

    let urls = items
        .iter()
        .filter_map(|item| match item {
            Value::String(url) => Some(url.clone()),
            Value::Object(obj) => obj.get("url").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .collect();

    Some(ResultPayload::Urls(urls))
}

fn extract_progress(map: &Map<String, Value>) -> (Option<f64>, Option<String>) {
    match map.get("progress") {
        Some(Value::Number(n)) => (n.as_f64(), phase_of(map)),
        Some(Value::Object(obj)) => (
            obj.get("percent").and_then(Value::as_f64),
            phase_of(obj).or_else(|| phase_of(map)),
        ),
        _ => (map.get("percent").and_then(Value::as_f64), phase_of(map)),
    }
}

fn phase_of(map: &Map<String, Value>) -> Option<String> {
    map.get("phase").and_then(Value::as_str).map(str::to_string)
}

fn message_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(obj) => obj
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_processing_with_progress_object() {
        let report = StatusReport::from_body(
            JobKind::Merge,
            r#"{"status":"processing","progress":{"percent":40,"phase":"stitching"}}"#,
        );
        assert_eq!(report.status, JobStatus::Processing);
        assert_eq!(report.percent, Some(40.0));
        assert_eq!(report.phase.as_deref(), Some("stitching"));
        assert!(report.result.is_none());
    }

    #[test]
    fn test_merge_success_field_priority() {
        let report = StatusReport::from_body(
            JobKind::Merge,
            r#"{"status":"Succeeded","video_url":"https://x/b.mp4","final_video_url":"https://x/a.mp4"}"#,
        );
        assert_eq!(report.status, JobStatus::Succeeded);
        assert_eq!(
            report.result,
            Some(ResultPayload::Url("https://x/a.mp4".to_string()))
        );
    }

    #[test]
    fn test_merge_result_url_fallback() {
        let report = StatusReport::from_body(
            JobKind::Merge,
            r#"{"status":"completed","result_url":"https://x/c.mp4"}"#,
        );
        assert_eq!(report.result.unwrap().url(), Some("https://x/c.mp4"));
    }

    #[test]
    fn test_images_urls_from_strings_and_objects() {
        let report = StatusReport::from_body(
            JobKind::Images,
            r#"{"status":"done","images":["https://x/1.png",{"url":"https://x/2.png"},42]}"#,
        );
        assert_eq!(
            report.result,
            Some(ResultPayload::Urls(vec![
                "https://x/1.png".to_string(),
                "https://x/2.png".to_string()
            ]))
        );
    }

    #[test]
    fn test_videos_without_status_but_with_result() {
        let report =
            StatusReport::from_body(JobKind::Videos, r#"{"video_urls":["https://x/1.mp4"]}"#);
        assert_eq!(report.status, JobStatus::Succeeded);
        assert_eq!(report.result.unwrap().urls().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_status_and_result_keeps_polling() {
        let report = StatusReport::from_body(JobKind::Videos, r#"{"percent":12}"#);
        assert_eq!(report.status, JobStatus::Processing);
        assert_eq!(report.percent, Some(12.0));
    }

    #[test]
    fn test_numeric_progress() {
        let report = StatusReport::from_body(
            JobKind::Images,
            r#"{"status":"in_progress","progress":73.5,"phase":"upscaling"}"#,
        );
        assert_eq!(report.percent, Some(73.5));
        assert_eq!(report.phase.as_deref(), Some("upscaling"));
    }

    #[test]
    fn test_failed_with_message() {
        let report = StatusReport::from_body(
            JobKind::Videos,
            r#"{"status":"ERROR","error":{"message":"GPU quota exceeded"}}"#,
        );
        assert_eq!(report.status, JobStatus::Failed);
        assert_eq!(report.error.as_deref(), Some("GPU quota exceeded"));
        assert!(report.result.is_none());
    }

    #[test]
    fn test_failed_uses_detail_field() {
        let report =
            StatusReport::from_body(JobKind::Merge, r#"{"status":"failed","detail":"bad clip"}"#);
        assert_eq!(report.error.as_deref(), Some("bad clip"));
    }

    #[test]
    fn test_script_document() {
        let report = StatusReport::from_body(
            JobKind::ScriptGeneration,
            r#"{"status":"completed","script":{"scenes":[{"text":"Hello"}]}}"#,
        );
        assert_eq!(
            report.result,
            Some(ResultPayload::Document(
                serde_json::json!({"scenes":[{"text":"Hello"}]})
            ))
        );
    }

    #[test]
    fn test_success_without_known_field_keeps_body() {
        let report =
            StatusReport::from_body(JobKind::ScriptGeneration, r#"{"status":"success","id":7}"#);
        assert_eq!(
            report.result,
            Some(ResultPayload::Document(
                serde_json::json!({"status":"success","id":7})
            ))
        );
    }

    #[test]
    fn test_malformed_body_is_opaque_result() {
        let report = StatusReport::from_body(JobKind::Merge, "<html>gateway</html>");
        assert_eq!(report.status, JobStatus::Succeeded);
        assert_eq!(
            report.result,
            Some(ResultPayload::Raw("<html>gateway</html>".to_string()))
        );
    }

    #[test]
    fn test_unknown_status_keeps_polling() {
        let report = StatusReport::from_body(JobKind::Images, r#"{"status":"warming_up"}"#);
        assert_eq!(report.status, JobStatus::Processing);
    }
}
