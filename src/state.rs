use crate::config::settings::AppConfig;
use crate::infrastructure::queue::recording_queue::RecordingQueue;
use crate::infrastructure::storage::local::VideoStorage;
use crate::modules::recording::repository::SharedJobStore;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: SharedJobStore,
    pub queue: RecordingQueue,
    pub videos: VideoStorage,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: SharedJobStore,
        queue: RecordingQueue,
        videos: VideoStorage,
    ) -> Self {
        Self {
            config,
            store,
            queue,
            videos,
        }
    }
}
