//! Submission: hand a document to the microservice and obtain a job id.
//!
//! Local files are checked before anything is sent, so a bad path is always
//! reported as a filesystem error rather than as a failed request. The file
//! is streamed into the multipart body straight from disk.

use crate::config::ClientConfig;
use crate::error::BuildVuError;
use crate::output::UploadResponse;
use crate::pipeline::download::{archive_file_name, archive_file_name_for_url};
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What the server should convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Upload a local file.
    Upload(PathBuf),
    /// Let the server fetch the document from this HTTP/HTTPS URL.
    Download(String),
}

impl InputSource {
    /// Form value of the `input` field.
    fn mode(&self) -> &'static str {
        match self {
            InputSource::Upload(_) => "upload",
            InputSource::Download(_) => "download",
        }
    }

    /// Local name for the output archive of this input.
    pub fn archive_name(&self) -> PathBuf {
        match self {
            InputSource::Upload(path) => archive_file_name(path),
            InputSource::Download(url) => archive_file_name_for_url(url),
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Open a local input file, mapping failures to input errors.
async fn open_local(path: &Path) -> Result<(tokio::fs::File, u64), BuildVuError> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(BuildVuError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(BuildVuError::InputUnreadable {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if !metadata.is_file() {
        return Err(BuildVuError::InputUnreadable {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }

    let file = tokio::fs::File::open(path)
        .await
        .map_err(|source| BuildVuError::InputUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("Opened input {} ({} bytes)", path.display(), metadata.len());
    Ok((file, metadata.len()))
}

/// Build the multipart form for `source`.
async fn build_form(config: &ClientConfig, source: &InputSource) -> Result<Form, BuildVuError> {
    let mut form = Form::new().text("input", source.mode());

    form = match source {
        InputSource::Upload(path) => {
            let (file, len) = open_local(path).await?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string());
            form.part("file", Part::stream_with_length(file, len).file_name(name))
        }
        InputSource::Download(url) => {
            if !is_url(url) {
                return Err(BuildVuError::InvalidInput { input: url.clone() });
            }
            form.text("url", url.clone())
        }
    };

    if let Some(ref callback) = config.callback_url {
        form = form.text("callbackUrl", callback.clone());
    }
    for (name, value) in &config.parameters {
        form = form.text(name.clone(), value.clone());
    }

    Ok(form)
}

/// Submit `source` to the conversion endpoint and return the job id.
pub async fn submit(
    http: &reqwest::Client,
    config: &ClientConfig,
    source: &InputSource,
) -> Result<String, BuildVuError> {
    let form = build_form(config, source).await?;

    match source {
        InputSource::Upload(path) => info!("Uploading {} to {}", path.display(), config.endpoint),
        InputSource::Download(url) => info!("Submitting {} to {}", url, config.endpoint),
    }

    let response = http
        .post(&config.endpoint)
        .multipart(form)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|source| BuildVuError::UploadError { source })?;

    let body = response
        .text()
        .await
        .map_err(|source| BuildVuError::UploadError { source })?;

    let uuid = parse_upload_body(&body)?;
    info!("Server accepted job {}", uuid);
    Ok(uuid)
}

/// Extract the job id from an upload response body.
fn parse_upload_body(body: &str) -> Result<String, BuildVuError> {
    let response: UploadResponse =
        serde_json::from_str(body).map_err(|e| BuildVuError::ServerError {
            detail: format!("unreadable upload response: {e}"),
        })?;

    match response.uuid {
        Some(uuid) if !uuid.is_empty() => Ok(uuid),
        _ => Err(BuildVuError::ServerError {
            detail: "no job identifier was returned for the uploaded file".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn parse_upload_body_accepts_uuid() {
        assert_eq!(
            parse_upload_body(r#"{"uuid":"0b4d6c2e"}"#).unwrap(),
            "0b4d6c2e"
        );
    }

    #[test]
    fn parse_upload_body_rejects_null_missing_and_garbage() {
        for body in [r#"{"uuid":null}"#, "{}", r#"{"uuid":""}"#, "<html>oops</html>"] {
            let err = parse_upload_body(body).unwrap_err();
            assert!(
                matches!(err, BuildVuError::ServerError { .. }),
                "{body}: {err}"
            );
        }
    }

    #[test]
    fn archive_name_follows_source() {
        assert_eq!(
            InputSource::Upload("in/report.pdf".into()).archive_name(),
            PathBuf::from("report.zip")
        );
        assert_eq!(
            InputSource::Download("https://host/files/slides.pptx".into()).archive_name(),
            PathBuf::from("slides.zip")
        );
    }

    #[tokio::test]
    async fn open_local_missing_file() {
        let err = open_local(Path::new("/definitely/not/a/real/file.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, BuildVuError::InputNotFound { .. }));
    }

    #[tokio::test]
    async fn open_local_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_local(dir.path()).await.unwrap_err();
        assert!(matches!(err, BuildVuError::InputUnreadable { .. }));
    }

    #[tokio::test]
    async fn download_source_requires_http_url() {
        let config = ClientConfig::builder("http://localhost:8080").build().unwrap();
        let err = build_form(&config, &InputSource::Download("ftp://host/doc.pdf".into()))
            .await
            .err()
            .expect("ftp URL must be rejected");
        assert!(matches!(err, BuildVuError::InvalidInput { .. }));
    }
}
