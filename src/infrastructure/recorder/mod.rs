use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

pub mod command;

pub use command::CommandRecorder;

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("Failed to record website: could not launch recorder: {0}")]
    Launch(String),
    #[error("Failed to record website: timed out after {0} seconds")]
    Timeout(u64),
    #[error("Failed to record website: {}", .stderr.as_deref().unwrap_or("recorder exited with an error"))]
    Failed {
        exit_code: Option<i32>,
        stderr: Option<String>,
    },
    #[error("Failed to record website: no video was produced")]
    NoArtifact,
    #[error("Failed to record website: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to record website: {0}")]
    Other(String),
}

/// Renders a page in a headless browser while recording it to a video file.
#[async_trait]
pub trait PageRecorder: Send + Sync {
    /// Records `url` and returns the path of the produced artifact.
    async fn record(&self, url: &str, request_id: &str) -> Result<PathBuf, RecorderError>;
}
