use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use time::OffsetDateTime;
use tracing::instrument;

use super::pool::DbPool;
use crate::modules::recording::model::{JobState, JobStatus, RecordingJob};
use crate::modules::recording::repository::{JobStore, StoreError};

pub struct PgJobStore {
    pool: DbPool,
}

impl PgJobStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn map_row(row: PgRow) -> Result<RecordingJob, StoreError> {
        let request_id: String = row.try_get("request_id").map_err(query_error)?;
        let status: String = row.try_get("status").map_err(query_error)?;
        let video_url: Option<String> = row.try_get("video_url").map_err(query_error)?;
        let error: Option<String> = row.try_get("error").map_err(query_error)?;

        let state = status
            .parse::<JobStatus>()
            .and_then(|status| JobState::from_parts(status, video_url, error))
            .map_err(|reason| StoreError::Corrupt {
                request_id: request_id.clone(),
                reason,
            })?;

        Ok(RecordingJob {
            request_id,
            url: row.try_get("url").map_err(query_error)?,
            state,
            created_at: row.try_get::<OffsetDateTime, _>("created_at").map_err(query_error)?,
            updated_at: row.try_get::<OffsetDateTime, _>("updated_at").map_err(query_error)?,
        })
    }
}

fn query_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Connection(e.to_string())
        }
        other => StoreError::Query(other.to_string()),
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    #[instrument(skip(self, job), fields(request_id = %job.request_id, status = %job.status()))]
    async fn put(&self, job: &RecordingJob) -> Result<(), StoreError> {
        // The WHERE clause makes the upsert refuse to touch a terminal row.
        let result = sqlx::query(
            r#"
            INSERT INTO recordings (request_id, url, status, video_url, error, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (request_id) DO UPDATE
            SET status = EXCLUDED.status,
                video_url = EXCLUDED.video_url,
                error = EXCLUDED.error,
                updated_at = EXCLUDED.updated_at
            WHERE recordings.status = 'queued'
            "#,
        )
        .bind(&job.request_id)
        .bind(&job.url)
        .bind(job.status().as_str())
        .bind(job.state.video_url())
        .bind(job.state.error())
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(job.request_id.clone()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, request_id: &str) -> Result<Option<RecordingJob>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT request_id, url, status, video_url, error, created_at, updated_at
            FROM recordings
            WHERE request_id = $1
            "#,
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error)?;

        row.map(Self::map_row).transpose()
    }
}
