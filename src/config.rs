//! Configuration types for talking to a BuildVu microservice.
//!
//! Everything the client needs to know about the server lives in
//! [`ClientConfig`], built via [`ClientConfigBuilder`]. A config is handed to
//! [`crate::ConversionClient::initialize`] once and never changes afterwards.

use crate::error::BuildVuError;
use crate::progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
use std::fmt;
use std::time::Duration;

/// Path segment appended to the base URL to reach the conversion endpoint.
pub const DEFAULT_SERVICE_PATH: &str = "buildvu";

/// Default connect timeout for each HTTP request.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default read timeout for each HTTP request.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Default ceiling on how long to wait for a job to finish converting.
pub const DEFAULT_CONVERSION_TIMEOUT: Duration = Duration::from_secs(30);

/// Default pause between two status requests.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for a [`crate::ConversionClient`].
///
/// # Example
/// ```rust
/// use buildvu_client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::builder("http://localhost:8080/microservice-example")
///     .request_timeout(Duration::from_secs(10), Duration::from_secs(30))
///     .conversion_timeout(Duration::from_secs(60))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.endpoint, "http://localhost:8080/microservice-example/buildvu");
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the microservice, without a trailing slash.
    ///
    /// Server-relative preview and download paths are joined onto this.
    pub base_url: String,

    /// Conversion endpoint, `{base_url}/{service_path}`. Derived by the builder.
    pub endpoint: String,

    /// Time allowed to establish each TCP/TLS connection. Default: 10 s.
    pub connect_timeout: Duration,

    /// Time allowed between reads of a response. Default: 30 s.
    pub read_timeout: Duration,

    /// Wall-clock limit on waiting for `processed`. Default: 30 s.
    pub conversion_timeout: Duration,

    /// Pause before each status request. Default: 1 s.
    pub poll_interval: Duration,

    /// URL the server should notify when the conversion finishes.
    pub callback_url: Option<String>,

    /// Extra form fields sent with every conversion request.
    pub parameters: Vec<(String, String)>,

    /// Receives workflow events (job accepted, each poll, download progress).
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("endpoint", &self.endpoint)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("conversion_timeout", &self.conversion_timeout)
            .field("poll_interval", &self.poll_interval)
            .field("callback_url", &self.callback_url)
            .field("parameters", &self.parameters)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ClientConfig {
    /// Create a builder for the microservice at `url`.
    pub fn builder(url: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            url: url.into(),
            service_path: DEFAULT_SERVICE_PATH.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            conversion_timeout: DEFAULT_CONVERSION_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            callback_url: None,
            parameters: Vec::new(),
            progress_callback: None,
        }
    }

    /// Join a server-relative path onto the base URL.
    pub fn resolve(&self, relative: &str) -> String {
        format!("{}/{}", self.base_url, relative)
    }

    /// The configured progress callback, or a no-op one.
    pub fn progress(&self) -> &dyn ConversionProgressCallback {
        match self.progress_callback {
            Some(ref cb) => cb.as_ref(),
            None => &NoopProgressCallback,
        }
    }
}

/// Builder for [`ClientConfig`].
pub struct ClientConfigBuilder {
    url: String,
    service_path: String,
    connect_timeout: Duration,
    read_timeout: Duration,
    conversion_timeout: Duration,
    poll_interval: Duration,
    callback_url: Option<String>,
    parameters: Vec<(String, String)>,
    progress_callback: Option<ProgressCallback>,
}

impl ClientConfigBuilder {
    /// Override the endpoint segment (default `buildvu`).
    pub fn service_path(mut self, path: impl Into<String>) -> Self {
        self.service_path = path.into().trim_matches('/').to_string();
        self
    }

    /// Connect and read timeouts applied to every HTTP request.
    pub fn request_timeout(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    pub fn request_timeout_secs(self, connect: u64, read: u64) -> Self {
        self.request_timeout(Duration::from_secs(connect), Duration::from_secs(read))
    }

    pub fn conversion_timeout(mut self, timeout: Duration) -> Self {
        self.conversion_timeout = timeout;
        self
    }

    pub fn conversion_timeout_secs(self, secs: u64) -> Self {
        self.conversion_timeout(Duration::from_secs(secs))
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    /// Add a form field sent alongside every conversion request.
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, BuildVuError> {
        let parsed = reqwest::Url::parse(&self.url)
            .map_err(|e| BuildVuError::InvalidConfig(format!("invalid URL '{}': {e}", self.url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BuildVuError::InvalidConfig(format!(
                "URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if self.service_path.is_empty() {
            return Err(BuildVuError::InvalidConfig(
                "Service path must not be empty".into(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(BuildVuError::InvalidConfig(
                "Poll interval must be greater than zero".into(),
            ));
        }
        if self.connect_timeout.is_zero() || self.read_timeout.is_zero() {
            return Err(BuildVuError::InvalidConfig(
                "Request timeouts must be greater than zero".into(),
            ));
        }

        let base_url = self.url.trim_end_matches('/').to_string();
        let endpoint = format!("{}/{}", base_url, self.service_path);

        Ok(ClientConfig {
            base_url,
            endpoint,
            connect_timeout: self.connect_timeout,
            read_timeout: self.read_timeout,
            conversion_timeout: self.conversion_timeout,
            poll_interval: self.poll_interval,
            callback_url: self.callback_url,
            parameters: self.parameters,
            progress_callback: self.progress_callback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_conventions() {
        let c = ClientConfig::builder("http://localhost:8080/microservice-example")
            .build()
            .unwrap();
        assert_eq!(c.base_url, "http://localhost:8080/microservice-example");
        assert_eq!(c.endpoint, "http://localhost:8080/microservice-example/buildvu");
        assert_eq!(c.connect_timeout, Duration::from_secs(10));
        assert_eq!(c.read_timeout, Duration::from_secs(30));
        assert_eq!(c.conversion_timeout, Duration::from_secs(30));
        assert_eq!(c.poll_interval, Duration::from_secs(1));
        assert!(c.callback_url.is_none());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let c = ClientConfig::builder("http://host:8080/svc/").build().unwrap();
        assert_eq!(c.base_url, "http://host:8080/svc");
        assert_eq!(c.endpoint, "http://host:8080/svc/buildvu");
        assert_eq!(c.resolve("output/x/index.html"), "http://host:8080/svc/output/x/index.html");
    }

    #[test]
    fn custom_service_path() {
        let c = ClientConfig::builder("http://host")
            .service_path("/jpedal/")
            .build()
            .unwrap();
        assert_eq!(c.endpoint, "http://host/jpedal");
    }

    #[test]
    fn rejects_invalid_url() {
        let err = ClientConfig::builder("not a url").build().unwrap_err();
        assert!(matches!(err, BuildVuError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = ClientConfig::builder("ftp://host/svc").build().unwrap_err();
        assert!(err.to_string().contains("ftp"));
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let err = ClientConfig::builder("http://host")
            .poll_interval(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, BuildVuError::InvalidConfig(_)));
    }

    #[test]
    fn secs_helpers() {
        let c = ClientConfig::builder("http://host")
            .request_timeout_secs(5, 15)
            .conversion_timeout_secs(90)
            .build()
            .unwrap();
        assert_eq!(c.connect_timeout, Duration::from_secs(5));
        assert_eq!(c.read_timeout, Duration::from_secs(15));
        assert_eq!(c.conversion_timeout, Duration::from_secs(90));
    }

    #[test]
    fn parameters_accumulate_in_order() {
        let c = ClientConfig::builder("http://host")
            .parameter("org.jpedal.pdf2html.textMode", "svg_realtext")
            .parameter("org.jpedal.pdf2html.viewMode", "content")
            .build()
            .unwrap();
        assert_eq!(c.parameters.len(), 2);
        assert_eq!(c.parameters[0].0, "org.jpedal.pdf2html.textMode");
    }

    #[test]
    fn progress_falls_back_to_noop() {
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::sync::Arc;

        struct Polls(AtomicU32);
        impl ConversionProgressCallback for Polls {
            fn on_poll(&self, attempt: u32, _state: &str) {
                self.0.store(attempt, Ordering::SeqCst);
            }
        }

        let bare = ClientConfig::builder("http://localhost:8080").build().unwrap();
        bare.progress().on_poll(1, "processing");

        let polls = Arc::new(Polls(AtomicU32::new(0)));
        let c = ClientConfig::builder("http://localhost:8080")
            .progress_callback(polls.clone())
            .build()
            .unwrap();
        c.progress().on_poll(3, "processing");
        assert_eq!(polls.0.load(Ordering::SeqCst), 3);
    }
}
