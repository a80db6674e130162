use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tracing::{Instrument, error, info, warn};

use crate::infrastructure::queue::recording_queue::{QueueError, RecordingQueueReceiver};
use crate::infrastructure::recorder::{PageRecorder, RecorderError};
use crate::modules::recording::events::RecordingTask;
use crate::modules::recording::model::{RecordingJob, video_path};
use crate::modules::recording::repository::{SharedJobStore, StoreError};

/// Sole consumer of the recording queue and sole writer of terminal job states.
/// Jobs run strictly one at a time, in submission order.
pub struct RecordingWorker {
    receiver: RecordingQueueReceiver,
    store: SharedJobStore,
    recorder: Arc<dyn PageRecorder>,
    retry_delay: Duration,
}

impl RecordingWorker {
    pub fn new(
        receiver: RecordingQueueReceiver,
        store: SharedJobStore,
        recorder: Arc<dyn PageRecorder>,
        retry_delay: Duration,
    ) -> Self {
        Self {
            receiver,
            store,
            recorder,
            retry_delay,
        }
    }

    /// Runs until the queue is closed. A failing recording never stops the loop.
    /// Store faults pause the worker and the store call is retried; the page is
    /// never recorded twice.
    pub async fn run(self) {
        info!("🎥 Recording worker started");

        loop {
            let task = match self.receiver.dequeue().await {
                Ok(task) => task,
                Err(QueueError::Closed) => break,
            };

            let span = tracing::info_span!("recording_job", request_id = %task.request_id);
            if let Err(e) = self.process_task(task).instrument(span).await {
                error!("❌ Error processing recording queue: {:#}", e);
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        info!("🎥 Recording worker stopped: queue closed");
    }

    async fn process_task(&self, task: RecordingTask) -> anyhow::Result<()> {
        info!("📦 Recording {}", task.url);

        let outcome = self
            .record(&task)
            .await
            .and_then(|artifact| {
                video_path(&task.request_id, &artifact).ok_or(RecorderError::NoArtifact)
            });

        let job = self.load_job(&task).await;

        let job = match outcome {
            Ok(video_url) => {
                info!("✅ Recording completed: {}", video_url);
                job.complete(video_url)?
            }
            Err(e) => {
                warn!("Recording failed: {}", e);
                job.fail(e.to_string())?
            }
        };

        self.save_result(&job).await;
        Ok(())
    }

    async fn load_job(&self, task: &RecordingTask) -> RecordingJob {
        loop {
            match self.store.get(&task.request_id).await {
                Ok(Some(job)) => return job,
                Ok(None) => {
                    warn!("Job missing from store, recreating it from the queued task");
                    return RecordingJob::queued(task.request_id.clone(), task.url.clone());
                }
                Err(e) => {
                    error!("❌ Failed to load job, retrying in {:?}: {}", self.retry_delay, e);
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }

    /// Writes a terminal record, retrying until the store accepts it.
    async fn save_result(&self, job: &RecordingJob) {
        loop {
            match self.store.put(job).await {
                Ok(()) => return,
                Err(StoreError::Conflict(_)) => {
                    warn!("Job already has a terminal record, keeping it");
                    return;
                }
                Err(e) => {
                    error!(
                        "❌ Failed to store {} result, retrying in {:?}: {}",
                        job.status(),
                        self.retry_delay,
                        e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }

    /// Invokes the recorder, turning a panic into an ordinary recording failure.
    async fn record(&self, task: &RecordingTask) -> Result<PathBuf, RecorderError> {
        AssertUnwindSafe(self.recorder.record(&task.url, &task.request_id))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(RecorderError::Other(panic_message(panic))))
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "recorder panicked".to_string()
    }
}
