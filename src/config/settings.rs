use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::config::env::{self, EnvKey};

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStoreBackend {
    Postgres,
    Redis,
    Memory,
}

impl FromStr for JobStoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(JobStoreBackend::Postgres),
            "redis" => Ok(JobStoreBackend::Redis),
            "memory" => Ok(JobStoreBackend::Memory),
            other => Err(ConfigError::InvalidValue {
                key: EnvKey::JobStore.as_str(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set for the selected job store")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub job_store: JobStoreBackend,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub videos_dir: PathBuf,
    pub public_base_url: Option<String>,
    pub recorder_command: String,
    pub recorder_timeout_secs: u64,
    pub worker_retry_delay_ms: u64,
    pub max_body_bytes: usize,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let job_store = env::get_or(EnvKey::JobStore, "postgres").parse::<JobStoreBackend>()?;

        let database_url = env::get_opt(EnvKey::DatabaseUrl);
        let redis_url = env::get_opt(EnvKey::RedisUrl);

        match job_store {
            JobStoreBackend::Postgres if database_url.is_none() => {
                return Err(ConfigError::Missing(EnvKey::DatabaseUrl.as_str()));
            }
            JobStoreBackend::Redis if redis_url.is_none() => {
                return Err(ConfigError::Missing(EnvKey::RedisUrl.as_str()));
            }
            _ => {}
        }

        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 8000),
            job_store,
            database_url,
            redis_url,
            videos_dir: PathBuf::from(env::get_or(EnvKey::VideosDir, "videos")),
            public_base_url: env::get_opt(EnvKey::PublicBaseUrl),
            recorder_command: env::get_or(EnvKey::RecorderCommand, "node scripts/record_page.mjs"),
            recorder_timeout_secs: env::get_parsed(EnvKey::RecorderTimeoutSecs, 300),
            worker_retry_delay_ms: env::get_parsed(EnvKey::WorkerRetryDelayMs, 1000),
            max_body_bytes: env::get_parsed(EnvKey::MaxBodyBytes, 64 * 1024),
        })
    }

    pub fn recorder_timeout(&self) -> Duration {
        Duration::from_secs(self.recorder_timeout_secs)
    }

    pub fn worker_retry_delay(&self) -> Duration {
        Duration::from_millis(self.worker_retry_delay_ms)
    }
}

impl Default for AppConfig {
    /// In-memory store, local `videos/` directory. Used by tests and local runs.
    fn default() -> Self {
        Self {
            server_port: 8000,
            job_store: JobStoreBackend::Memory,
            database_url: None,
            redis_url: None,
            videos_dir: PathBuf::from("videos"),
            public_base_url: None,
            recorder_command: "node scripts/record_page.mjs".to_string(),
            recorder_timeout_secs: 300,
            worker_retry_delay_ms: 1000,
            max_body_bytes: 64 * 1024,
        }
    }
}
