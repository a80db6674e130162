use async_trait::async_trait;
use redis::{AsyncCommands, Script};
use tracing::instrument;

use super::client::RedisService;
use crate::modules::recording::model::RecordingJob;
use crate::modules::recording::repository::{JobStore, StoreError};

const KEY_PREFIX: &str = "recording:";

// Writes ARGV[1] unless the stored record is already terminal. Returns 1 on write.
const PUT_IF_NOT_TERMINAL: &str = r#"
local current = redis.call('GET', KEYS[1])
if current then
    local status = cjson.decode(current)['status']
    if status ~= 'queued' then
        return 0
    end
end
redis.call('SET', KEYS[1], ARGV[1])
return 1
"#;

pub struct RedisJobStore {
    redis: RedisService,
    put_script: Script,
}

impl RedisJobStore {
    pub fn new(redis: RedisService) -> Self {
        Self {
            redis,
            put_script: Script::new(PUT_IF_NOT_TERMINAL),
        }
    }

    fn key(request_id: &str) -> String {
        format!("{}{}", KEY_PREFIX, request_id)
    }

    async fn conn(&self) -> Result<redis::aio::MultiplexedConnection, StoreError> {
        self.redis
            .get_conn()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))
    }
}

#[async_trait]
impl JobStore for RedisJobStore {
    #[instrument(skip(self, job), fields(request_id = %job.request_id, status = %job.status()))]
    async fn put(&self, job: &RecordingJob) -> Result<(), StoreError> {
        let payload = serde_json::to_string(job).map_err(|e| StoreError::Query(e.to_string()))?;
        let mut conn = self.conn().await?;

        let written: i32 = self
            .put_script
            .key(Self::key(&job.request_id))
            .arg(payload)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        if written == 0 {
            return Err(StoreError::Conflict(job.request_id.clone()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, request_id: &str) -> Result<Option<RecordingJob>, StoreError> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn
            .get(Self::key(request_id))
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        raw.map(|raw| {
            serde_json::from_str::<RecordingJob>(&raw).map_err(|e| StoreError::Corrupt {
                request_id: request_id.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(RedisJobStore::key("abc"), "recording:abc");
    }
}
