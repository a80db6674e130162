use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{PageRecorder, RecorderError};
use crate::infrastructure::storage::local::VideoStorage;

const STDERR_TAIL: usize = 2000;

/// Browser capture parameters handed to the recorder script.
#[derive(Clone, Debug)]
struct CaptureSettings {
    viewport_width: u32,
    viewport_height: u32,
    navigation_timeout_ms: u64,
    settle_delay_ms: u64,
    scroll_increment_px: u32,
    scroll_pause_ms: u64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            viewport_width: 1280,
            viewport_height: 720,
            navigation_timeout_ms: 60_000,
            settle_delay_ms: 1_000,
            scroll_increment_px: 100,
            scroll_pause_ms: 100,
        }
    }
}

impl CaptureSettings {
    fn env(&self) -> [(&'static str, String); 6] {
        [
            ("RECORD_VIEWPORT_WIDTH", self.viewport_width.to_string()),
            ("RECORD_VIEWPORT_HEIGHT", self.viewport_height.to_string()),
            ("RECORD_NAVIGATION_TIMEOUT_MS", self.navigation_timeout_ms.to_string()),
            ("RECORD_SETTLE_DELAY_MS", self.settle_delay_ms.to_string()),
            ("RECORD_SCROLL_INCREMENT_PX", self.scroll_increment_px.to_string()),
            ("RECORD_SCROLL_PAUSE_MS", self.scroll_pause_ms.to_string()),
        ]
    }
}

/// Drives an external browser-automation command. It is invoked as
/// `<program> [args..] <url> <output_dir>` and must leave a `.webm` file in
/// `output_dir` when it exits successfully.
pub struct CommandRecorder {
    program: String,
    args: Vec<String>,
    storage: VideoStorage,
    timeout: Duration,
    settings: CaptureSettings,
}

impl CommandRecorder {
    /// `command_line` is split on whitespace into program and leading arguments.
    pub fn new(
        command_line: &str,
        storage: VideoStorage,
        timeout: Duration,
    ) -> Result<Self, RecorderError> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| RecorderError::Launch("empty recorder command".to_string()))?;

        Ok(Self {
            program,
            args: parts.collect(),
            storage,
            timeout,
            settings: CaptureSettings::default(),
        })
    }

}

#[async_trait]
impl PageRecorder for CommandRecorder {
    async fn record(&self, url: &str, request_id: &str) -> Result<PathBuf, RecorderError> {
        let output_dir = self.storage.job_dir(request_id);
        tokio::fs::create_dir_all(&output_dir).await?;

        info!("🎬 Recording {} into {}", url, output_dir.display());
        debug!(program = %self.program, args = ?self.args, "Spawning recorder");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(url)
            .arg(&output_dir)
            .envs(self.settings.env())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RecorderError::Launch(format!("{}: {}", self.program, e)))?;

        let mut stderr_pipe = child.stderr.take();
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Some(pipe) = stderr_pipe.as_mut() {
                if let Err(e) = pipe.read_to_end(&mut buf).await {
                    debug!("Recorder stderr read stopped early: {}", e);
                }
            }
            String::from_utf8_lossy(&buf).into_owned()
        });

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                warn!("Recorder timed out after {:?}, killing process", self.timeout);
                let _ = child.kill().await;
                return Err(RecorderError::Timeout(self.timeout.as_secs()));
            }
        };

        let stderr = stderr_task.await.unwrap_or_default();

        if !status.success() {
            return Err(RecorderError::Failed {
                exit_code: status.code(),
                stderr: tail(&stderr),
            });
        }

        self.storage
            .find_artifact(request_id)
            .await?
            .ok_or(RecorderError::NoArtifact)
    }
}

/// Trailing part of the recorder's stderr, capped so it fits in a status record.
fn tail(stderr: &str) -> Option<String> {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        return None;
    }
    let start = trimmed
        .char_indices()
        .rev()
        .nth(STDERR_TAIL - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    Some(trimmed[start..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_command_line() {
        let recorder = CommandRecorder::new(
            "node scripts/record_page.mjs --headless",
            VideoStorage::new("videos"),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(recorder.program, "node");
        assert_eq!(recorder.args, ["scripts/record_page.mjs", "--headless"]);
    }

    #[test]
    fn rejects_empty_command() {
        let result = CommandRecorder::new("   ", VideoStorage::new("videos"), Duration::from_secs(1));
        assert!(matches!(result, Err(RecorderError::Launch(_))));
    }

    #[test]
    fn tail_keeps_end_of_output() {
        assert_eq!(tail("  \n"), None);
        assert_eq!(tail("navigation timeout\n").as_deref(), Some("navigation timeout"));
        let long = "x".repeat(STDERR_TAIL + 10);
        assert_eq!(tail(&long).unwrap().len(), STDERR_TAIL);
    }

    #[test]
    fn failure_messages_carry_prefix() {
        let err = RecorderError::Failed {
            exit_code: Some(1),
            stderr: Some("navigation timeout".into()),
        };
        assert_eq!(err.to_string(), "Failed to record website: navigation timeout");
        assert_eq!(
            RecorderError::Timeout(30).to_string(),
            "Failed to record website: timed out after 30 seconds"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn missing_program_is_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = CommandRecorder::new(
            "definitely-not-a-real-recorder-binary",
            VideoStorage::new(dir.path()),
            Duration::from_secs(5),
        )
        .unwrap();
        let err = recorder.record("https://example.com", "job").await.unwrap_err();
        assert!(matches!(err, RecorderError::Launch(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = CommandRecorder {
            program: "sh".into(),
            args: vec!["-c".into(), "echo navigation timeout >&2; exit 3".into(), "sh".into()],
            storage: VideoStorage::new(dir.path()),
            timeout: Duration::from_secs(5),
            settings: CaptureSettings::default(),
        };
        let err = recorder.record("https://example.com", "job").await.unwrap_err();
        match err {
            RecorderError::Failed { exit_code, stderr } => {
                assert_eq!(exit_code, Some(3));
                assert_eq!(stderr.as_deref(), Some("navigation timeout"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_utf8_stderr_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = CommandRecorder {
            program: "sh".into(),
            args: vec![
                "-c".into(),
                "printf 'net::ERR \\377 failed' >&2; exit 1".into(),
                "sh".into(),
            ],
            storage: VideoStorage::new(dir.path()),
            timeout: Duration::from_secs(5),
            settings: CaptureSettings::default(),
        };
        let err = recorder.record("https://example.com", "job").await.unwrap_err();
        match err {
            RecorderError::Failed { stderr, .. } => {
                assert_eq!(stderr.as_deref(), Some("net::ERR \u{FFFD} failed"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_run_returns_webm() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = CommandRecorder {
            program: "sh".into(),
            // $1 = url, $2 = output dir
            args: vec!["-c".into(), "touch \"$2/page.webm\"".into(), "sh".into()],
            storage: VideoStorage::new(dir.path()),
            timeout: Duration::from_secs(5),
            settings: CaptureSettings::default(),
        };
        let path = recorder.record("https://example.com", "job").await.unwrap();
        assert_eq!(path, dir.path().join("job").join("page.webm"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_recorder_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = CommandRecorder {
            program: "sh".into(),
            args: vec!["-c".into(), "sleep 5".into(), "sh".into()],
            storage: VideoStorage::new(dir.path()),
            timeout: Duration::from_millis(100),
            settings: CaptureSettings::default(),
        };
        let err = recorder.record("https://example.com", "job").await.unwrap_err();
        assert!(matches!(err, RecorderError::Timeout(_)));
    }
}
