//! Error types for the buildvu-client library.
//!
//! Every stage of the workflow has its own variant so callers can tell a
//! local problem (missing input, unwritable output directory) from a
//! transport failure or a failure reported by the conversion server. All
//! variants carry enough context to be printed as-is; transport failures
//! keep the underlying [`reqwest::Error`] as their `source`.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// All errors returned by the buildvu-client library.
#[derive(Debug, Error)]
pub enum BuildVuError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// `convert` was called on a client that was never initialised.
    #[error("Converter has not been set up.\nCall ConversionClient::initialize() before converting a file.")]
    NotConfigured,

    /// `initialize` was called on a client that already holds a configuration.
    #[error("Converter is already set up; configuration can only be set once")]
    AlreadyConfigured,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// Input file exists but could not be opened for reading.
    #[error("Cannot read input file '{path}': {source}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A remote input was given that is not an HTTP/HTTPS URL.
    #[error("Invalid input '{input}': not a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    // ── Server round-trip errors ──────────────────────────────────────────
    /// Sending the file to the converter failed (connect, timeout, non-2xx).
    #[error("Error uploading file: {source}")]
    UploadError {
        #[source]
        source: reqwest::Error,
    },

    /// The server answered, but not with what the protocol requires.
    #[error("The server ran into an error: {detail}\nSee the server logs for details.")]
    ServerError { detail: String },

    /// A status request for a running job failed.
    #[error("Error checking conversion status of job {uuid}: {source}")]
    PollError {
        uuid: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server reported that the conversion itself failed.
    #[error("The server ran into an error converting job {uuid}: {detail}\nSee the server logs for details.")]
    ConversionError { uuid: String, detail: String },

    /// The job did not reach `processed` within the configured limit.
    #[error("Failed: file took longer than {limit:?} to convert")]
    ConversionTimeout { limit: Duration },

    // ── Download errors ───────────────────────────────────────────────────
    /// The archive URL answered with a non-success status.
    #[error("Failed: status code {status} for {url}")]
    DownloadError { status: u16, url: String },

    /// The archive request or body stream failed at the transport level.
    #[error("Error downloading conversion output from '{url}': {source}")]
    DownloadFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Could not create or write the local archive file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
