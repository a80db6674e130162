use axum::Router;
use axum::routing::{get, post};
use crate::state::AppState;

pub mod dto;
pub mod events;
pub mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/record", post(handler::record))
        .route("/status/{request_id}", get(handler::get_status))
}
