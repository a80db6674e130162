use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;

use crate::config::settings::{AppConfig, JobStoreBackend};
use crate::infrastructure::db::job_store::PgJobStore;
use crate::infrastructure::db::pool::{connect_to_db, run_migrations};
use crate::infrastructure::redis::client::RedisService;
use crate::infrastructure::redis::job_store::RedisJobStore;
use crate::modules::recording::repository::{MemoryJobStore, SharedJobStore};

pub struct JobStoreFactory;

impl JobStoreFactory {
    pub async fn create(config: &AppConfig) -> Result<SharedJobStore> {
        match config.job_store {
            JobStoreBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is required for the postgres job store")?;
                let pool = connect_to_db(url)
                    .await
                    .context("Failed to connect to PostgreSQL")?;
                run_migrations(&pool)
                    .await
                    .context("Failed to apply database migrations")?;
                Ok(Arc::new(PgJobStore::new(pool)))
            }
            JobStoreBackend::Redis => {
                let url = config
                    .redis_url
                    .as_deref()
                    .context("REDIS_URL is required for the redis job store")?;
                let redis = RedisService::new(url)
                    .await
                    .context("Failed to connect to Redis")?;
                Ok(Arc::new(RedisJobStore::new(redis)))
            }
            JobStoreBackend::Memory => {
                warn!("⚠️ Using in-memory job store; job status will not survive a restart");
                Ok(Arc::new(MemoryJobStore::new()))
            }
        }
    }
}
