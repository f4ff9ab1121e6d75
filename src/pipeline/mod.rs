//! Stages of a conversion round-trip.
//!
//! ```text
//! upload ──▶ poll ──▶ download
//! (job id)   (state)   (archive, optional)
//! ```
//!
//! 1. [`upload`]   — validate the input and submit it; returns the job id
//! 2. [`poll`]     — query the job until `processed`, `error`, or the deadline
//! 3. [`download`] — stream the output archive into the output directory
//!
//! Each stage takes the shared `reqwest::Client` and the immutable
//! [`crate::ClientConfig`]; none of them hold state between calls.

pub mod download;
pub mod poll;
pub mod upload;
