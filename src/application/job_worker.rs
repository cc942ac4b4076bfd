//! Background consumer for redirect counting and record expiry.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info, warn};

use crate::application::services::LinkService;
use crate::domain::job::Job;
use crate::error::AppError;

/// Retries after the first failed attempt of a job.
const MAX_RETRIES: usize = 3;
const MAX_RETRY_DELAY: Duration = Duration::from_secs(2);
/// Delay before a job that exhausted its retries is delivered again.
pub const REQUEUE_DELAY: Duration = Duration::from_secs(60);

/// Consumes jobs until every sender is dropped or `shutdown` completes,
/// running at most `concurrency` of them at once.
///
/// On shutdown the channel is closed and jobs already buffered are still
/// processed. Returns after in-flight jobs have finished.
pub async fn run_job_worker(
    mut rx: mpsc::Receiver<Job>,
    service: Arc<LinkService>,
    concurrency: usize,
    shutdown: impl Future<Output = ()>,
) {
    let concurrency = concurrency.max(1);
    let permits = Arc::new(Semaphore::new(concurrency));
    info!(concurrency, "Job worker started");

    tokio::pin!(shutdown);
    let mut shutting_down = false;

    loop {
        let job = tokio::select! {
            job = rx.recv() => job,
            () = &mut shutdown, if !shutting_down => {
                info!("Job worker draining queued jobs");
                shutting_down = true;
                rx.close();
                continue;
            }
        };

        let Some(job) = job else { break };

        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let service = service.clone();
        tokio::spawn(async move {
            let _permit = permit;
            process_job(&service, &job).await;
        });
    }

    // Wait for in-flight jobs.
    let _ = permits.acquire_many(concurrency as u32).await;
    info!("Job worker stopped");
}

/// Runs a single job, retrying transient failures with exponential backoff.
///
/// A job still failing transiently after its retries goes back to the queue
/// for another delivery after [`REQUEUE_DELAY`]. Other failures are logged
/// and the job is dropped. Both job kinds are safe to run again.
pub async fn process_job(service: &LinkService, job: &Job) {
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(50)
        .max_delay(MAX_RETRY_DELAY)
        .map(jitter)
        .take(MAX_RETRIES);

    let result = RetryIf::spawn(strategy, || handle(service, job), AppError::is_retryable).await;

    match result {
        Ok(()) => debug!(kind = job.kind(), code = job.code(), "Job done"),
        Err(e) if e.is_retryable() => {
            warn!(kind = job.kind(), code = job.code(), "Job failed, requeueing: {}", e);
            service.requeue(job, REQUEUE_DELAY).await;
        }
        Err(e) => {
            metrics::counter!("shortener_jobs_failed_total", "kind" => job.kind()).increment(1);
            error!(kind = job.kind(), code = job.code(), "Job failed: {}", e);
        }
    }
}

async fn handle(service: &LinkService, job: &Job) -> Result<(), AppError> {
    match job {
        Job::CountRedirect { code } => service.count_redirect(code).await,
        Job::ExpireOld { code } => service.expire_old(code).await.map(|_| ()),
    }
}
