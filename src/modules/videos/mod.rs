use axum::Router;
use tower_http::services::ServeDir;

use crate::infrastructure::storage::local::VideoStorage;
use crate::state::AppState;

/// Static delivery of recorded videos. `ServeDir` handles byte ranges,
/// conditional requests and rejects paths escaping the videos directory.
pub fn router(videos: &VideoStorage) -> Router<AppState> {
    Router::new().nest_service("/videos", ServeDir::new(videos.root()))
}
