//! Status polling for a submitted job.
//!
//! The loop is bounded by a wall-clock deadline, not by an attempt count, so
//! the limit stays correct whatever the poll interval is. A request that is
//! in flight when the deadline passes is still allowed to finish: a job that
//! completes on that last poll is reported as completed.

use crate::config::ClientConfig;
use crate::error::BuildVuError;
use crate::output::{JobState, StatusResponse};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// Poll `uuid` until it is processed, fails, or the conversion timeout expires.
///
/// Sleeps `config.poll_interval` before every request.
pub async fn wait_for_completion(
    http: &reqwest::Client,
    config: &ClientConfig,
    uuid: &str,
) -> Result<StatusResponse, BuildVuError> {
    let start = Instant::now();
    let deadline = start + config.conversion_timeout;
    let mut attempt: u32 = 0;

    loop {
        sleep(config.poll_interval).await;
        attempt += 1;

        let status = poll_status(http, config, uuid).await?;
        let state = status.job_state();
        debug!("Job {}: poll {} → {}", uuid, attempt, state);
        config.progress().on_poll(attempt, &status.state);

        match state {
            JobState::Processed => {
                info!(
                    "Job {} processed after {} polls ({}ms)",
                    uuid,
                    attempt,
                    start.elapsed().as_millis()
                );
                return Ok(status);
            }
            JobState::Error => {
                let detail = status.failure_detail();
                warn!("Job {} failed on the server: {}", uuid, detail);
                return Err(BuildVuError::ConversionError {
                    uuid: uuid.to_string(),
                    detail,
                });
            }
            JobState::Pending(_) => {}
        }

        if Instant::now() >= deadline {
            warn!(
                "Job {} still '{}' after {:?}; giving up",
                uuid, status.state, config.conversion_timeout
            );
            return Err(BuildVuError::ConversionTimeout {
                limit: config.conversion_timeout,
            });
        }
    }
}

/// One status request.
async fn poll_status(
    http: &reqwest::Client,
    config: &ClientConfig,
    uuid: &str,
) -> Result<StatusResponse, BuildVuError> {
    let poll_err = |source| BuildVuError::PollError {
        uuid: uuid.to_string(),
        source,
    };

    let response = http
        .get(&config.endpoint)
        .query(&[("uuid", uuid)])
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(poll_err)?;

    let body = response.text().await.map_err(poll_err)?;

    serde_json::from_str(&body).map_err(|e| BuildVuError::ServerError {
        detail: format!("unreadable status for job {uuid}: {e}"),
    })
}
