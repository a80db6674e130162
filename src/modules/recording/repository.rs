use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use super::model::RecordingJob;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("query failed: {0}")]
    Query(String),
    #[error("record {0} is already terminal")]
    Conflict(String),
    #[error("corrupt record {request_id}: {reason}")]
    Corrupt { request_id: String, reason: String },
}

/// Durable record of every job's status, keyed by request id.
///
/// `put` returns only once the record is persisted, so a status query issued after
/// it resolves always observes the write. Implementations refuse to overwrite a
/// record that already reached a terminal state.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn put(&self, job: &RecordingJob) -> Result<(), StoreError>;

    async fn get(&self, request_id: &str) -> Result<Option<RecordingJob>, StoreError>;
}

pub type SharedJobStore = Arc<dyn JobStore>;

/// Process-local store. Nothing survives a restart, so it only backs tests and
/// local runs.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<String, RecordingJob>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    #[cfg(test)]
    pub(crate) async fn snapshot(&self) -> Vec<RecordingJob> {
        self.jobs.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn put(&self, job: &RecordingJob) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        if let Some(current) = jobs.get(&job.request_id) {
            if current.status().is_terminal() {
                return Err(StoreError::Conflict(job.request_id.clone()));
            }
        }
        jobs.insert(job.request_id.clone(), job.clone());
        Ok(())
    }

    async fn get(&self, request_id: &str) -> Result<Option<RecordingJob>, StoreError> {
        Ok(self.jobs.read().await.get(request_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::recording::model::JobStatus;

    #[tokio::test]
    async fn put_then_get_returns_latest_record() {
        let store = MemoryJobStore::new();
        let job = RecordingJob::queued("abc".into(), "https://example.com".into());
        store.put(&job).await.unwrap();
        assert_eq!(store.get("abc").await.unwrap().unwrap().status(), JobStatus::Queued);

        let done = job.complete("videos/abc/a.webm".into()).unwrap();
        store.put(&done).await.unwrap();
        assert_eq!(store.get("abc").await.unwrap(), Some(done.clone()));
        assert_eq!(store.len().await, 1);

        let err = store.put(&done).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(id) if id == "abc"));
    }

    #[tokio::test]
    async fn unknown_id_is_none() {
        let store = MemoryJobStore::new();
        assert!(store.get("missing").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }
}
