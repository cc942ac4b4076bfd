//! HTTP server initialization and runtime setup.
//!
//! Handles storage and job queue selection, worker spawning, and Axum server
//! lifecycle.

use crate::application::job_worker::run_job_worker;
use crate::application::services::{LinkService, LinkSettings, UrlShortener};
use crate::config::{Config, StorageBackend};
use crate::domain::job::Job;
use crate::domain::job_queue::JobQueue;
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::persistence::{InMemoryUrlRepository, PgUrlRepository};
use crate::infrastructure::queue::{InMemoryJobQueue, RedisJobQueue};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::letter_generator::ConsistentLetterGenerator;
use crate::utils::text_entropier::UpperLowerCaseEntropier;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - URL storage (PostgreSQL with migrations, or in-memory)
/// - Job queue (Redis, or in-memory fallback)
/// - Background job worker
/// - Axum HTTP server with graceful shutdown on Ctrl+C / SIGTERM
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository = build_repository(&config).await?;

    let (job_tx, job_rx) = mpsc::channel(config.job_queue_capacity);
    let jobs = build_job_queue(&config, job_tx).await;

    let shortener = Arc::new(UrlShortener::new(
        Box::new(ConsistentLetterGenerator::default()),
        Box::new(UpperLowerCaseEntropier::new()),
        config.public_base_url.clone(),
    ));

    let link_service = Arc::new(LinkService::new(
        repository,
        jobs,
        shortener,
        LinkSettings {
            code_length: config.shortcut_length,
            retention: config.retention(),
        },
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker = tokio::spawn(run_job_worker(
        job_rx,
        link_service.clone(),
        config.job_worker_concurrency,
        wait_for(shutdown_rx),
    ));

    let state = AppState::new(link_service, config.permanent_redirect);
    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .await?;

    tracing::info!("Server stopped, waiting for job worker");
    if let Err(e) = worker.await {
        tracing::error!("Job worker task failed: {}", e);
    }

    Ok(())
}

/// Opens the configured storage backend.
async fn build_repository(config: &Config) -> Result<Arc<dyn UrlRepository>> {
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, records are lost on restart");
            Ok(Arc::new(InMemoryUrlRepository::new()))
        }
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required with STORAGE_BACKEND=postgres")?;

            let pool = connect_pool(config, database_url).await?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;

            Ok(Arc::new(PgUrlRepository::new(Arc::new(pool))))
        }
    }
}

async fn connect_pool(config: &Config, database_url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Selects the job queue, falling back to the in-memory queue when Redis is
/// not configured or unreachable.
async fn build_job_queue(config: &Config, job_tx: mpsc::Sender<Job>) -> Arc<dyn JobQueue> {
    if let Some(redis_url) = &config.redis_url {
        match RedisJobQueue::connect(redis_url, &config.queue_key_prefix).await {
            Ok(queue) => {
                let queue = Arc::new(queue);
                tokio::spawn(
                    queue
                        .clone()
                        .run_pump(job_tx, config.queue_poll_interval()),
                );
                tracing::info!("Job queue enabled (Redis)");
                return queue;
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to Redis: {}. Using in-memory job queue.",
                    e
                );
            }
        }
    } else {
        tracing::info!("Job queue: in-memory");
    }

    Arc::new(InMemoryJobQueue::new(job_tx))
}

async fn wait_for(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
