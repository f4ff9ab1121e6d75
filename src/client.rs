//! The conversion client: configure once, convert many times.
//!
//! A [`ConversionClient`] starts out empty and receives its [`ClientConfig`]
//! through [`ConversionClient::initialize`]. The configuration can be set
//! exactly once; after that the client is read-only and can be shared
//! between tasks behind an `Arc` or a `&'static`.

use crate::config::ClientConfig;
use crate::error::BuildVuError;
use crate::output::ConversionResult;
use crate::pipeline::download;
use crate::pipeline::poll;
use crate::pipeline::upload::{self, InputSource};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tokio::time::Instant;
use tracing::info;

/// Everything produced by `initialize`.
#[derive(Debug)]
struct Configured {
    config: ClientConfig,
    http: reqwest::Client,
}

/// Client for a BuildVu conversion microservice.
///
/// # Example
/// ```rust,no_run
/// use buildvu_client::{ClientConfig, ConversionClient};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ConversionClient::new();
/// client.initialize(ClientConfig::builder("http://localhost:8080/microservice-example").build()?)?;
///
/// let preview = client
///     .convert("path/to/file.pdf", Some(Path::new("path/to/output/dir")))
///     .await?;
/// println!("Converted: {preview}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConversionClient {
    state: OnceLock<Configured>,
}

impl ConversionClient {
    /// Create a client with no configuration yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client and initialise it with `config`.
    pub fn with_config(config: ClientConfig) -> Result<Self, BuildVuError> {
        let client = Self::new();
        client.initialize(config)?;
        Ok(client)
    }

    /// Store the configuration and build the HTTP client. No network call.
    ///
    /// # Errors
    /// [`BuildVuError::AlreadyConfigured`] if the client was initialised before.
    pub fn initialize(&self, config: ClientConfig) -> Result<(), BuildVuError> {
        if self.state.get().is_some() {
            return Err(BuildVuError::AlreadyConfigured);
        }

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .user_agent(concat!("buildvu-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BuildVuError::Internal(format!("Failed to build HTTP client: {e}")))?;

        let endpoint = config.endpoint.clone();
        self.state
            .set(Configured { config, http })
            .map_err(|_| BuildVuError::AlreadyConfigured)?;

        info!("Converter configured for {}", endpoint);
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.state.get().is_some()
    }

    /// The active configuration, if any.
    pub fn config(&self) -> Option<&ClientConfig> {
        self.state.get().map(|s| &s.config)
    }

    fn configured(&self) -> Result<&Configured, BuildVuError> {
        self.state.get().ok_or(BuildVuError::NotConfigured)
    }

    /// Convert a local file and return the URL where the output can be
    /// previewed.
    ///
    /// When `output_dir` is given, the output archive is also downloaded to
    /// `{output_dir}/{input stem}.zip`.
    ///
    /// # Errors
    /// - [`BuildVuError::NotConfigured`] before [`Self::initialize`]
    /// - [`BuildVuError::InputNotFound`] / [`BuildVuError::InputUnreadable`]
    ///   before any request is sent
    /// - any stage error of the round-trip; nothing is returned on failure
    pub async fn convert(
        &self,
        input: impl AsRef<Path>,
        output_dir: Option<&Path>,
    ) -> Result<String, BuildVuError> {
        let input = input.as_ref();
        let result = self
            .submit(&InputSource::Upload(input.to_path_buf()))
            .await?;

        if let Some(dir) = output_dir {
            self.download_result(&result, dir).await?;
        }

        self.finish(result)
    }

    /// Let the server fetch `url` itself and convert it.
    ///
    /// The archive, if requested, is named after the last URL path segment.
    pub async fn convert_url(
        &self,
        url: &str,
        output_dir: Option<&Path>,
    ) -> Result<String, BuildVuError> {
        let result = self
            .submit(&InputSource::Download(url.to_string()))
            .await?;

        if let Some(dir) = output_dir {
            self.download_result(&result, dir).await?;
        }

        self.finish(result)
    }

    /// Blocking wrapper around [`Self::convert`].
    ///
    /// Runs the conversion on a private current-thread tokio runtime. Do not
    /// call it from inside an async context.
    pub fn convert_sync(
        &self,
        input: impl AsRef<Path>,
        output_dir: Option<&Path>,
    ) -> Result<String, BuildVuError> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| BuildVuError::Internal(format!("Failed to create tokio runtime: {e}")))?
            .block_on(self.convert(input, output_dir))
    }

    /// Submit a document, wait for it to be processed, and return the full
    /// result without downloading anything.
    pub async fn submit(&self, source: &InputSource) -> Result<ConversionResult, BuildVuError> {
        let state = self.configured()?;
        let config = &state.config;
        let start = Instant::now();

        let uuid = upload::submit(&state.http, config, source).await?;
        config.progress().on_job_accepted(&uuid);

        let status = poll::wait_for_completion(&state.http, config, &uuid).await?;

        let preview_path = status
            .preview_path
            .ok_or_else(|| BuildVuError::ServerError {
                detail: format!("job {uuid} was processed but has no preview path"),
            })?;
        let download_url = status.download_path.as_deref().map(|p| config.resolve(p));

        info!(
            "Job {} finished in {}ms",
            uuid,
            start.elapsed().as_millis()
        );

        Ok(ConversionResult {
            preview_url: config.resolve(&preview_path),
            preview_path,
            download_path: status.download_path,
            download_url,
            archive_name: source.archive_name(),
            uuid,
        })
    }

    /// Download the output archive of `result` to
    /// `{output_dir}/{result.archive_name}`.
    ///
    /// Returns the path of the written archive.
    pub async fn download_result(
        &self,
        result: &ConversionResult,
        output_dir: impl AsRef<Path>,
    ) -> Result<PathBuf, BuildVuError> {
        let state = self.configured()?;
        let url = result
            .download_url
            .as_deref()
            .ok_or_else(|| BuildVuError::ServerError {
                detail: format!("job {} has no download path", result.uuid),
            })?;

        let dest = output_dir.as_ref().join(&result.archive_name);
        download::download_archive(&state.http, &state.config, url, &dest).await
    }

    fn finish(&self, result: ConversionResult) -> Result<String, BuildVuError> {
        let state = self.configured()?;
        state.config.progress().on_conversion_complete(&result.preview_url);
        Ok(result.preview_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::builder("http://localhost:8080/microservice-example")
            .build()
            .unwrap()
    }

    #[test]
    fn new_client_is_unconfigured() {
        let client = ConversionClient::new();
        assert!(!client.is_configured());
        assert!(client.config().is_none());
    }

    #[test]
    fn initialize_only_once() {
        let client = ConversionClient::new();
        client.initialize(config()).unwrap();
        assert!(client.is_configured());

        let err = client.initialize(config()).unwrap_err();
        assert!(matches!(err, BuildVuError::AlreadyConfigured));
        assert_eq!(
            client.config().unwrap().endpoint,
            "http://localhost:8080/microservice-example/buildvu"
        );
    }

    #[tokio::test]
    async fn convert_before_initialize_fails() {
        let client = ConversionClient::new();
        let err = client.convert("doc.pdf", None).await.unwrap_err();
        assert!(matches!(err, BuildVuError::NotConfigured));
    }

    #[tokio::test]
    async fn download_result_without_download_path() {
        let client = ConversionClient::with_config(config()).unwrap();
        let result = ConversionResult {
            uuid: "abc".into(),
            preview_path: "output/abc/index.html".into(),
            download_path: None,
            preview_url: "http://localhost:8080/microservice-example/output/abc/index.html".into(),
            download_url: None,
            archive_name: "abc.zip".into(),
        };
        let dir = tempfile::tempdir().unwrap();
        let err = client
            .download_result(&result, dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, BuildVuError::ServerError { .. }));
    }

    #[test]
    fn client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConversionClient>();
    }
}
