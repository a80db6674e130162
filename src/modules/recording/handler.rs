use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, Uri, header},
    response::IntoResponse,
    Json,
};
use tracing::{error, warn};
use url::Url;

use super::dto::{ErrorResponse, RecordRequest, RecordResponse, StatusResponse};
use super::service::{RecordingError, RecordingService, URL_REQUIRED};
use crate::common::response::ApiError;
use crate::state::AppState;

impl From<RecordingError> for ApiError {
    fn from(e: RecordingError) -> Self {
        match e {
            RecordingError::InvalidInput(msg) => ApiError(msg, StatusCode::BAD_REQUEST),
            RecordingError::NotFound => ApiError(e.to_string(), StatusCode::NOT_FOUND),
            RecordingError::Store(_) | RecordingError::Queue(_) => {
                error!("Recording request failed: {}", e);
                ApiError(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

/// Queue a website recording
#[utoipa::path(
    post,
    path = "/record",
    request_body = RecordRequest,
    responses(
        (status = 200, description = "Recording queued", body = RecordResponse),
        (status = 400, description = "URL missing or empty", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    ),
    tag = "Recording"
)]
pub async fn record(
    State(state): State<AppState>,
    payload: Result<Json<RecordRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!("Rejected record payload: {}", rejection.body_text());
            return ApiError(URL_REQUIRED.to_string(), StatusCode::BAD_REQUEST).into_response();
        }
    };

    match RecordingService::submit(state.store.as_ref(), &state.queue, req).await {
        Ok(res) => (StatusCode::OK, Json(res)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Check the status of a recording request
#[utoipa::path(
    get,
    path = "/status/{request_id}",
    params(
        ("request_id" = String, Path, description = "Request ID returned by /record")
    ),
    responses(
        (status = 200, description = "Recording status", body = StatusResponse),
        (status = 404, description = "Request ID not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse)
    ),
    tag = "Recording"
)]
pub async fn get_status(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    headers: HeaderMap,
    uri: Uri,
) -> impl IntoResponse {
    let base = base_url(state.config.public_base_url.as_deref(), &headers, &uri);

    match RecordingService::get_status(state.store.as_ref(), &request_id, base.as_ref()).await {
        Ok(res) => (StatusCode::OK, Json(res)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Base that stored video paths are joined onto. A configured public URL wins;
/// otherwise the request's own scheme and host, honouring reverse-proxy headers.
pub fn base_url(configured: Option<&str>, headers: &HeaderMap, uri: &Uri) -> Option<Url> {
    if let Some(configured) = configured {
        let mut url = Url::parse(configured).ok()?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        return Some(url);
    }

    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let host = header_value("x-forwarded-host")
        .or_else(|| header_value(header::HOST.as_str()))
        .or_else(|| uri.authority().map(|a| a.as_str()))?;
    let scheme = header_value("x-forwarded-proto")
        .or_else(|| uri.scheme_str())
        .unwrap_or("http");

    Url::parse(&format!("{}://{}/", scheme, host)).ok()
}
