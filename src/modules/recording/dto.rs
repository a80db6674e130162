use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::model::{JobState, JobStatus};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordRequest {
    #[validate(required(message = "URL is required"), length(min = 1, message = "URL is required"))]
    #[schema(example = "https://example.com")]
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordResponse {
    pub success: bool,
    pub request_id: String,
    pub status: JobStatus,
    pub message: String,
}

/// Status of a recording as returned to pollers. Exactly one of `video_url` and
/// `error` is present once the job is terminal; neither while it is queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: JobStatus,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusResponse {
    /// `resolve_video` turns the stored relative path into an absolute URL.
    pub fn from_state(
        request_id: String,
        state: JobState,
        resolve_video: impl FnOnce(&str) -> String,
    ) -> Self {
        let status = state.status();
        let (video_url, error) = match state {
            JobState::Queued => (None, None),
            JobState::Completed { video_url } => (Some(resolve_video(&video_url)), None),
            JobState::Failed { error } => (None, Some(error)),
        };
        Self {
            status,
            request_id,
            video_url,
            error,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_empty_url_is_invalid() {
        assert!(RecordRequest { url: None }.validate().is_err());
        assert!(RecordRequest { url: Some(String::new()) }.validate().is_err());
        assert!(RecordRequest { url: Some("https://example.com".into()) }.validate().is_ok());
    }

    #[test]
    fn queued_status_omits_optional_fields() {
        let response = StatusResponse::from_state("abc".into(), JobState::Queued, |p| p.to_string());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "queued", "request_id": "abc" }));
    }

    #[test]
    fn completed_status_resolves_video_url() {
        let state = JobState::Completed { video_url: "videos/abc/a.webm".into() };
        let response = StatusResponse::from_state("abc".into(), state, |p| format!("http://host/{p}"));
        assert_eq!(response.video_url.as_deref(), Some("http://host/videos/abc/a.webm"));
        assert_eq!(response.error, None);
    }
}
