use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use utoipa::ToSchema;

/// URL prefix under which recorded videos are served.
pub const VIDEOS_ROUTE: &str = "videos";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Queued)
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(format!("Invalid job status: {}", s)),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle of a recording. The payload of a terminal state lives on the variant,
/// so a completed job cannot carry an error and a failed job cannot carry a video.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Completed { video_url: String },
    Failed { error: String },
}

impl JobState {
    pub fn status(&self) -> JobStatus {
        match self {
            JobState::Queued => JobStatus::Queued,
            JobState::Completed { .. } => JobStatus::Completed,
            JobState::Failed { .. } => JobStatus::Failed,
        }
    }

    /// Rebuilds a state from its flat storage columns.
    pub fn from_parts(
        status: JobStatus,
        video_url: Option<String>,
        error: Option<String>,
    ) -> Result<Self, String> {
        match (status, video_url, error) {
            (JobStatus::Queued, None, None) => Ok(JobState::Queued),
            (JobStatus::Completed, Some(video_url), None) => Ok(JobState::Completed { video_url }),
            (JobStatus::Failed, None, Some(error)) => Ok(JobState::Failed { error }),
            (status, video_url, error) => Err(format!(
                "inconsistent {} record (video_url set: {}, error set: {})",
                status,
                video_url.is_some(),
                error.is_some()
            )),
        }
    }

    pub fn video_url(&self) -> Option<&str> {
        match self {
            JobState::Completed { video_url } => Some(video_url),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            JobState::Failed { error } => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("job {request_id} is already {from} and cannot become {to}")]
pub struct TransitionError {
    pub request_id: String,
    pub from: JobStatus,
    pub to: JobStatus,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RecordingJob {
    pub request_id: String,
    pub url: String,
    #[serde(flatten)]
    pub state: JobState,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl RecordingJob {
    pub fn queued(request_id: String, url: String) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            request_id,
            url,
            state: JobState::Queued,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.state.status()
    }

    pub fn complete(self, video_url: String) -> Result<Self, TransitionError> {
        self.transition(JobState::Completed { video_url })
    }

    pub fn fail(self, error: String) -> Result<Self, TransitionError> {
        self.transition(JobState::Failed { error })
    }

    fn transition(mut self, next: JobState) -> Result<Self, TransitionError> {
        let from = self.status();
        if from.is_terminal() {
            return Err(TransitionError {
                request_id: self.request_id,
                from,
                to: next.status(),
            });
        }
        self.state = next;
        self.updated_at = OffsetDateTime::now_utc();
        Ok(self)
    }
}

/// Relative path a finished artifact is served from: `videos/{request_id}/{file name}`.
pub fn video_path(request_id: &str, artifact: &Path) -> Option<String> {
    let file_name = artifact.file_name()?.to_str()?;
    Some(format!("{}/{}/{}", VIDEOS_ROUTE, request_id, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn queued_job_can_complete_once() {
        let job = RecordingJob::queued("abc".into(), "https://example.com".into());
        let done = job.complete("videos/abc/x.webm".into()).unwrap();
        assert_eq!(done.status(), JobStatus::Completed);
        assert_eq!(done.state.video_url(), Some("videos/abc/x.webm"));
        assert_eq!(done.state.error(), None);

        let err = done.fail("late".into()).unwrap_err();
        assert_eq!(err.request_id, "abc");
        assert_eq!(err.from, JobStatus::Completed);
        assert_eq!(err.to, JobStatus::Failed);
    }

    #[test]
    fn failed_job_is_terminal() {
        let job = RecordingJob::queued("abc".into(), "https://example.com".into());
        let failed = job.fail("navigation timeout".into()).unwrap();
        assert_eq!(failed.state.error(), Some("navigation timeout"));
        assert_eq!(failed.state.video_url(), None);
        assert!(failed.complete("videos/abc/x.webm".into()).is_err());
    }

    #[test]
    fn from_parts_rejects_mixed_payloads() {
        assert!(JobState::from_parts(JobStatus::Queued, Some("v".into()), None).is_err());
        assert!(JobState::from_parts(JobStatus::Completed, None, None).is_err());
        assert!(
            JobState::from_parts(JobStatus::Failed, Some("v".into()), Some("e".into())).is_err()
        );
        assert_eq!(
            JobState::from_parts(JobStatus::Failed, None, Some("e".into())).unwrap(),
            JobState::Failed { error: "e".into() }
        );
    }

    #[test]
    fn video_path_uses_request_id_and_base_name() {
        let artifact = PathBuf::from("/var/videos/abc/3f9c1.webm");
        assert_eq!(video_path("abc", &artifact).as_deref(), Some("videos/abc/3f9c1.webm"));
        assert_eq!(video_path("abc", Path::new("/")), None);
    }

    #[test]
    fn job_serializes_flat_status() {
        let job = RecordingJob::queued("abc".into(), "https://example.com".into())
            .fail("boom".into())
            .unwrap();
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["error"], "boom");
        let back: RecordingJob = serde_json::from_value(value).unwrap();
        assert_eq!(back, job);
    }
}
