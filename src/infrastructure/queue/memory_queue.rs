//! Job queue backed by the worker channel and tokio timers.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::domain::job::Job;
use crate::domain::job_queue::{JobQueue, QueueError};

/// Process-local job queue.
///
/// Redirect jobs go straight into the bounded worker channel and are dropped
/// when it is full. Expiry jobs wait in a spawned timer task, so pending
/// expiries are lost on restart.
pub struct InMemoryJobQueue {
    tx: mpsc::Sender<Job>,
}

impl InMemoryJobQueue {
    pub fn new(tx: mpsc::Sender<Job>) -> Self {
        Self { tx }
    }

    /// Sends `job` to the worker from a timer task once `delay` has passed.
    fn deliver_after(&self, job: Job, delay: Duration) -> Result<(), QueueError> {
        if self.tx.is_closed() {
            return Err(QueueError::Closed);
        }

        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            if let Err(e) = tx.send(job).await {
                warn!(
                    kind = e.0.kind(),
                    code = e.0.code(),
                    "Job dropped, job worker stopped"
                );
            }
        });

        Ok(())
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue_redirect(&self, code: &str) -> Result<(), QueueError> {
        match self.tx.try_send(Job::count_redirect(code)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                metrics::counter!("shortener_jobs_dropped_total").increment(1);
                Err(QueueError::Full)
            }
            Err(TrySendError::Closed(_)) => Err(QueueError::Closed),
        }
    }

    async fn schedule_expiry(&self, code: &str, delay: Duration) -> Result<(), QueueError> {
        debug!(code, ?delay, "Expiry scheduled");
        self.deliver_after(Job::expire_old(code), delay)
    }

    async fn requeue(&self, job: &Job, delay: Duration) -> Result<(), QueueError> {
        debug!(kind = job.kind(), code = job.code(), ?delay, "Job requeued");
        self.deliver_after(job.clone(), delay)
    }

    async fn health_check(&self) -> bool {
        !self.tx.is_closed()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_redirect_is_delivered_immediately() {
        let (tx, mut rx) = mpsc::channel(4);
        let queue = InMemoryJobQueue::new(tx);

        queue.enqueue_redirect("ExAAAAAAB").await.unwrap();

        assert_eq!(rx.try_recv().unwrap(), Job::count_redirect("ExAAAAAAB"));
    }

    #[tokio::test]
    async fn test_full_queue_rejects_redirect() {
        let (tx, _rx) = mpsc::channel(1);
        let queue = InMemoryJobQueue::new(tx);

        queue.enqueue_redirect("a").await.unwrap();
        assert_eq!(queue.enqueue_redirect("b").await, Err(QueueError::Full));
    }

    #[tokio::test]
    async fn test_closed_queue() {
        let (tx, rx) = mpsc::channel(1);
        let queue = InMemoryJobQueue::new(tx);
        drop(rx);

        assert!(!queue.health_check().await);
        assert_eq!(queue.enqueue_redirect("a").await, Err(QueueError::Closed));
        assert_eq!(
            queue.schedule_expiry("a", Duration::from_secs(1)).await,
            Err(QueueError::Closed)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_is_delivered_after_delay() {
        let (tx, mut rx) = mpsc::channel(4);
        let queue = InMemoryJobQueue::new(tx);

        queue
            .schedule_expiry("ExAAAAAAB", Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(rx.recv().await, Some(Job::expire_old("ExAAAAAAB")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_requeued_job_is_delivered_again_after_delay() {
        let (tx, mut rx) = mpsc::channel(4);
        let queue = InMemoryJobQueue::new(tx);

        queue
            .requeue(&Job::count_redirect("ExAAAAAAB"), Duration::from_secs(30))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(rx.recv().await, Some(Job::count_redirect("ExAAAAAAB")));
    }
}
