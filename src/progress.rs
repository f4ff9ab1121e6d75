//! Progress-callback trait for conversion workflow events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ClientConfigBuilder::progress_callback`] to be told when
//! the server accepts a job, after every status request, while the archive
//! downloads, and when the preview URL is ready.
//!
//! # Example
//!
//! ```rust
//! use buildvu_client::{ClientConfig, ConversionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicU32, Ordering}};
//!
//! struct PollCounter {
//!     polls: AtomicU32,
//! }
//!
//! impl ConversionProgressCallback for PollCounter {
//!     fn on_poll(&self, attempt: u32, state: &str) {
//!         self.polls.store(attempt, Ordering::SeqCst);
//!         eprintln!("poll #{attempt}: {state}");
//!     }
//! }
//!
//! let counter = Arc::new(PollCounter { polls: AtomicU32::new(0) });
//!
//! let config = ClientConfig::builder("http://localhost:8080/microservice-example")
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the client as a conversion moves through its stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync` because one
/// client may serve conversions from several tasks.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once the server has accepted the document.
    ///
    /// # Arguments
    /// * `uuid` — job identifier issued by the server
    fn on_job_accepted(&self, uuid: &str) {
        let _ = uuid;
    }

    /// Called after every status request.
    ///
    /// # Arguments
    /// * `attempt` — 1-based poll counter
    /// * `state`   — state string reported by the server
    fn on_poll(&self, attempt: u32, state: &str) {
        let _ = (attempt, state);
    }

    /// Called as archive bytes are written to disk.
    ///
    /// # Arguments
    /// * `downloaded` — bytes written so far
    /// * `total`      — `Content-Length` when the server sent one
    fn on_download_progress(&self, downloaded: u64, total: Option<u64>) {
        let _ = (downloaded, total);
    }

    /// Called once with the preview URL of a finished conversion.
    fn on_conversion_complete(&self, preview_url: &str) {
        let _ = preview_url;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ClientConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
