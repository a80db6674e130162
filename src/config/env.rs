use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    JobStore,
    DatabaseUrl,
    RedisUrl,
    VideosDir,
    PublicBaseUrl,
    RecorderCommand,
    RecorderTimeoutSecs,
    WorkerRetryDelayMs,
    MaxBodyBytes,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::JobStore => "JOB_STORE",
            EnvKey::DatabaseUrl => "DATABASE_URL",
            EnvKey::RedisUrl => "REDIS_URL",
            EnvKey::VideosDir => "VIDEOS_DIR",
            EnvKey::PublicBaseUrl => "PUBLIC_BASE_URL",
            EnvKey::RecorderCommand => "RECORDER_COMMAND",
            EnvKey::RecorderTimeoutSecs => "RECORDER_TIMEOUT_SECS",
            EnvKey::WorkerRetryDelayMs => "WORKER_RETRY_DELAY_MS",
            EnvKey::MaxBodyBytes => "MAX_BODY_BYTES",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

/// Like [`get`], but treats an empty value as unset.
pub fn get_opt(key: EnvKey) -> Option<String> {
    env::var(key.as_str()).ok().filter(|v| !v.trim().is_empty())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
