use thiserror::Error;
use tracing::{error, info};
use url::Url;
use uuid::Uuid;
use validator::Validate;

use super::dto::{RecordRequest, RecordResponse, StatusResponse};
use super::events::RecordingTask;
use super::model::{JobStatus, RecordingJob};
use super::repository::{JobStore, StoreError};
use crate::infrastructure::queue::recording_queue::{QueueError, RecordingQueue};

pub const URL_REQUIRED: &str = "URL is required";
pub const REQUEST_NOT_FOUND: &str = "Request ID not found";

#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Request ID not found")]
    NotFound,
    #[error("job store error: {0}")]
    Store(#[from] StoreError),
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
}

pub struct RecordingService;

impl RecordingService {
    /// Registers a job as queued, then hands it to the worker. The store write
    /// completes before the task is enqueued, so an immediate status poll never
    /// misses the job.
    pub async fn submit(
        store: &dyn JobStore,
        queue: &RecordingQueue,
        mut req: RecordRequest,
    ) -> Result<RecordResponse, RecordingError> {
        req.url = req.url.map(|url| url.trim().to_string());
        req.validate()
            .map_err(|_| RecordingError::InvalidInput(URL_REQUIRED.to_string()))?;
        let url = req
            .url
            .ok_or_else(|| RecordingError::InvalidInput(URL_REQUIRED.to_string()))?;

        let request_id = Uuid::new_v4().to_string();
        let job = RecordingJob::queued(request_id.clone(), url.clone());
        store.put(&job).await?;

        let enqueued = queue.enqueue(RecordingTask {
            request_id: request_id.clone(),
            url,
        });
        if let Err(e) = enqueued {
            // nothing will ever pick this job up
            if let Ok(failed) = job.fail(format!("Failed to queue recording: {}", e)) {
                if let Err(store_err) = store.put(&failed).await {
                    error!(request_id = %request_id, "Failed to mark unqueued job as failed: {}", store_err);
                }
            }
            return Err(e.into());
        }

        info!(request_id = %request_id, backlog = queue.len(), "Recording queued");

        Ok(RecordResponse {
            success: true,
            request_id,
            status: JobStatus::Queued,
            message: "Recording has been queued".to_string(),
        })
    }

    pub async fn get_status(
        store: &dyn JobStore,
        request_id: &str,
        base_url: Option<&Url>,
    ) -> Result<StatusResponse, RecordingError> {
        let job = store
            .get(request_id)
            .await?
            .ok_or(RecordingError::NotFound)?;

        Ok(StatusResponse::from_state(job.request_id, job.state, |path| {
            absolute_url(base_url, path)
        }))
    }
}

/// Joins a stored relative video path onto the public base URL. Without a known
/// base the path is returned rooted at `/`.
pub fn absolute_url(base_url: Option<&Url>, relative: &str) -> String {
    let relative = relative.trim_start_matches('/');
    match base_url {
        Some(base) => base
            .join(relative)
            .map(String::from)
            .unwrap_or_else(|_| format!("{}{}", base, relative)),
        None => format!("/{}", relative),
    }
}
