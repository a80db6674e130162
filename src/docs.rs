use utoipa::OpenApi;
use crate::modules::recording::dto::*;
use crate::modules::recording::model::JobStatus;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::recording::handler::record,
        crate::modules::recording::handler::get_status,
    ),
    components(
        schemas(RecordRequest, RecordResponse, StatusResponse, ErrorResponse, JobStatus)
    ),
    tags(
        (name = "Recording", description = "Queue website recordings and poll their status")
    )
)]
pub struct ApiDoc;
