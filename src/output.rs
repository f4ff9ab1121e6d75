//! Wire types exchanged with the microservice and the result handed back to
//! callers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Body returned by `POST {endpoint}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    /// Job identifier. `null` or missing means the server refused the job.
    #[serde(default)]
    pub uuid: Option<String>,
}

/// Body returned by `GET {endpoint}?uuid={id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub state: String,
    #[serde(default)]
    pub download_path: Option<String>,
    #[serde(default)]
    pub preview_path: Option<String>,
    /// Numeric or textual code sent alongside `state: "error"`.
    #[serde(default)]
    pub error_code: Option<serde_json::Value>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl StatusResponse {
    pub fn job_state(&self) -> JobState {
        JobState::from(self.state.as_str())
    }

    /// Human-readable failure description for an `error` state.
    pub fn failure_detail(&self) -> String {
        let code = self.error_code.as_ref().map(|c| match c {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        });
        match (code, self.error_message.as_deref()) {
            (Some(code), Some(msg)) => format!("{code}: {msg}"),
            (Some(code), None) => format!("error code {code}"),
            (None, Some(msg)) => msg.to_string(),
            (None, None) => "no details reported".to_string(),
        }
    }
}

/// Lifecycle state of a conversion job as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    /// Terminal: output is ready.
    Processed,
    /// Terminal: the server failed to convert the document.
    Error,
    /// Anything else (`queued`, `processing`, …); keep polling.
    Pending(String),
}

impl From<&str> for JobState {
    fn from(s: &str) -> Self {
        match s {
            "processed" => JobState::Processed,
            "error" => JobState::Error,
            other => JobState::Pending(other.to_string()),
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Processed => f.write_str("processed"),
            JobState::Error => f.write_str("error"),
            JobState::Pending(s) => f.write_str(s),
        }
    }
}

/// Outcome of a finished conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    /// Job identifier issued at submission.
    pub uuid: String,
    /// Server-relative path of the converted output's preview.
    pub preview_path: String,
    /// Server-relative path of the output archive, when the server offers one.
    pub download_path: Option<String>,
    /// `{base_url}/{preview_path}`.
    pub preview_url: String,
    /// `{base_url}/{download_path}`.
    pub download_url: Option<String>,
    /// File name the archive is saved under, derived from the input.
    pub archive_name: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_state_from_str() {
        assert_eq!(JobState::from("processed"), JobState::Processed);
        assert_eq!(JobState::from("error"), JobState::Error);
        assert_eq!(
            JobState::from("processing"),
            JobState::Pending("processing".into())
        );
        assert_eq!(JobState::from("queued").to_string(), "queued");
    }

    #[test]
    fn status_response_camel_case() {
        let r: StatusResponse = serde_json::from_str(
            r#"{"state":"processed","downloadPath":"output/a/doc.zip","previewPath":"output/a/doc/index.html"}"#,
        )
        .unwrap();
        assert_eq!(r.job_state(), JobState::Processed);
        assert_eq!(r.download_path.as_deref(), Some("output/a/doc.zip"));
        assert_eq!(r.preview_path.as_deref(), Some("output/a/doc/index.html"));
    }

    #[test]
    fn in_progress_status_has_no_paths() {
        let r: StatusResponse = serde_json::from_str(r#"{"state":"processing"}"#).unwrap();
        assert!(r.download_path.is_none());
        assert!(r.preview_path.is_none());
    }

    #[test]
    fn failure_detail_variants() {
        let r: StatusResponse = serde_json::from_str(
            r#"{"state":"error","errorCode":1050,"errorMessage":"Invalid PDF"}"#,
        )
        .unwrap();
        assert_eq!(r.failure_detail(), "1050: Invalid PDF");

        let r: StatusResponse = serde_json::from_str(r#"{"state":"error"}"#).unwrap();
        assert_eq!(r.failure_detail(), "no details reported");
    }

    #[test]
    fn upload_response_null_uuid() {
        let r: UploadResponse = serde_json::from_str(r#"{"uuid":null}"#).unwrap();
        assert!(r.uuid.is_none());
        let r: UploadResponse = serde_json::from_str("{}").unwrap();
        assert!(r.uuid.is_none());
    }
}
