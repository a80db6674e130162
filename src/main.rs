use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use site_recorder::app;
use site_recorder::config::settings::AppConfig;
use site_recorder::infrastructure::job_store_factory::JobStoreFactory;
use site_recorder::infrastructure::queue::recording_queue::recording_queue;
use site_recorder::infrastructure::recorder::CommandRecorder;
use site_recorder::infrastructure::storage::local::VideoStorage;
use site_recorder::state::AppState;
use site_recorder::workers::recording_worker::RecordingWorker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn")),
        )
        .init();

    info!("Starting server...");

    let config = AppConfig::new().context("Invalid configuration")?;

    let videos = VideoStorage::new(config.videos_dir.clone());
    videos
        .ensure_root()
        .await
        .context("Failed to create videos directory")?;

    let store = JobStoreFactory::create(&config).await?;
    let (queue, receiver) = recording_queue();

    let recorder = CommandRecorder::new(
        &config.recorder_command,
        videos.clone(),
        config.recorder_timeout(),
    )?;

    let worker = RecordingWorker::new(
        receiver,
        store.clone(),
        Arc::new(recorder),
        config.worker_retry_delay(),
    );
    let worker_handle = tokio::spawn(worker.run());

    let port = config.server_port;
    let state = AppState::new(config, store, queue, videos);
    let app = app::create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running on http://{}", addr);

    // The worker only returns if it crashed; exit so the supervisor restarts us.
    tokio::select! {
        served = axum::serve(listener, app).into_future() => {
            served.context("Server error")?;
        }
        joined = worker_handle => {
            error!("❌ Recording worker exited unexpectedly: {:?}", joined);
            return Err(anyhow!("recording worker exited"));
        }
    }

    Ok(())
}
