//! # buildvu-client
//!
//! Client for the BuildVu document conversion microservice.
//!
//! The service converts documents (PDF, Office files, …) to HTML or SVG. A
//! conversion is a short conversation with the server: send the document,
//! poll until the job is done, optionally fetch the output archive, and hand
//! back the URL where the result can be viewed in a browser.
//!
//! ## Workflow
//!
//! ```text
//! file / URL
//!  │
//!  ├─ 1. Upload    POST {endpoint}            → job uuid
//!  ├─ 2. Poll      GET  {endpoint}?uuid=…     until processed / error / deadline
//!  ├─ 3. Download  GET  {base}/{downloadPath} → {output_dir}/{stem}.zip (optional)
//!  └─ 4. Return    {base}/{previewPath}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use buildvu_client::{ClientConfig, ConversionClient};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder("http://localhost:8080/microservice-example")
//!         .conversion_timeout_secs(60)
//!         .build()?;
//!     let client = ConversionClient::with_config(config)?;
//!
//!     let preview = client
//!         .convert("path/to/file.pdf", Some(Path::new("path/to/output/dir")))
//!         .await?;
//!     println!("Converted: {preview}");
//!     Ok(())
//! }
//! ```
//!
//! Blocking callers use [`ConversionClient::convert_sync`] instead.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `buildvu` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::ConversionClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::BuildVuError;
pub use output::{ConversionResult, JobState};
pub use pipeline::download::{archive_file_name, archive_file_name_for_url};
pub use pipeline::upload::InputSource;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
