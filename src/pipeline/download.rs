//! Archive download.
//!
//! The response body is streamed through a fixed-size buffer into a
//! temporary file next to the destination, then renamed into place. Memory
//! use does not grow with archive size, and a failed download never leaves a
//! truncated archive behind: the temporary file is removed when dropped.

use crate::config::ClientConfig;
use crate::error::BuildVuError;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

/// Write buffer size for streamed downloads.
pub const DOWNLOAD_BUFFER_SIZE: usize = 64 * 1024;

/// Archive name used when the input gives nothing better.
const FALLBACK_ARCHIVE_NAME: &str = "output.zip";

/// Local archive name for an uploaded file: the input's name with a `.zip`
/// extension, e.g. `reports/q3.pdf` → `q3.zip`.
pub fn archive_file_name(input: &Path) -> PathBuf {
    match input.file_name() {
        Some(name) => PathBuf::from(name).with_extension("zip"),
        None => PathBuf::from(FALLBACK_ARCHIVE_NAME),
    }
}

/// Local archive name for a document the server fetched from `url`.
pub fn archive_file_name_for_url(url: &str) -> PathBuf {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() {
                    return PathBuf::from(last).with_extension("zip");
                }
            }
        }
    }
    PathBuf::from(FALLBACK_ARCHIVE_NAME)
}

/// Download `url` to `dest`, creating the parent directory if needed.
pub async fn download_archive(
    http: &reqwest::Client,
    config: &ClientConfig,
    url: &str,
    dest: &Path,
) -> Result<PathBuf, BuildVuError> {
    info!("Downloading {} to {}", url, dest.display());

    let response = http
        .get(url)
        .send()
        .await
        .map_err(|source| BuildVuError::DownloadFailed {
            url: url.to_string(),
            source,
        })?;

    if !response.status().is_success() {
        return Err(BuildVuError::DownloadError {
            status: response.status().as_u16(),
            url: url.to_string(),
        });
    }

    let write_err = |source| BuildVuError::OutputWriteFailed {
        path: dest.to_path_buf(),
        source,
    };

    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tokio::fs::create_dir_all(&dir).await.map_err(write_err)?;

    let tmp = tempfile::Builder::new()
        .prefix(".buildvu-")
        .suffix(".part")
        .tempfile_in(&dir)
        .map_err(write_err)?;
    let handle = tmp.as_file().try_clone().map_err(write_err)?;
    let mut writer = BufWriter::with_capacity(DOWNLOAD_BUFFER_SIZE, tokio::fs::File::from_std(handle));

    let total = response.content_length();
    let mut downloaded: u64 = 0;
    let mut body = response.bytes_stream();

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|source| BuildVuError::DownloadFailed {
            url: url.to_string(),
            source,
        })?;
        writer.write_all(&chunk).await.map_err(write_err)?;
        downloaded += chunk.len() as u64;
        config.progress().on_download_progress(downloaded, total);
    }

    writer.flush().await.map_err(write_err)?;
    let file = writer.into_inner();
    file.sync_all().await.map_err(write_err)?;
    drop(file);

    tmp.persist(dest).map_err(|e| write_err(e.error))?;

    debug!("Wrote {} bytes to {}", downloaded, dest.display());
    Ok(dest.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_name_replaces_extension() {
        assert_eq!(archive_file_name(Path::new("path/to/file.pdf")), PathBuf::from("file.zip"));
        assert_eq!(archive_file_name(Path::new("slides.pptx")), PathBuf::from("slides.zip"));
        assert_eq!(archive_file_name(Path::new("README")), PathBuf::from("README.zip"));
        assert_eq!(
            archive_file_name(Path::new("my.report.v2.pdf")),
            PathBuf::from("my.report.v2.zip")
        );
    }

    #[test]
    fn archive_name_without_file_name_falls_back() {
        assert_eq!(archive_file_name(Path::new("/")), PathBuf::from("output.zip"));
    }

    #[test]
    fn archive_name_for_url() {
        assert_eq!(
            archive_file_name_for_url("https://files.example.com/docs/annual.pdf?dl=1"),
            PathBuf::from("annual.zip")
        );
        assert_eq!(
            archive_file_name_for_url("https://files.example.com/"),
            PathBuf::from("output.zip")
        );
        assert_eq!(archive_file_name_for_url("not a url"), PathBuf::from("output.zip"));
    }
}
