//! Queue contract for background jobs.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::job::Job;

/// Errors raised while handing a job to the queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("job queue is full")]
    Full,
    #[error("job queue is closed")]
    Closed,
    #[error("job queue backend error: {0}")]
    Backend(String),
}

/// Fire-and-forget delivery of background jobs.
///
/// Delivery is at-least-once; consumers must tolerate duplicates. A job is
/// only dropped when the worker gives up on a non-transient error or the
/// backend itself refuses it.
///
/// # Implementations
///
/// - [`crate::infrastructure::queue::InMemoryJobQueue`] - tokio channel and timers
/// - [`crate::infrastructure::queue::RedisJobQueue`] - Redis list and sorted set
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Queues a redirect to be counted.
    async fn enqueue_redirect(&self, code: &str) -> Result<(), QueueError>;

    /// Queues the expiry of a record, visible to the worker only after `delay`.
    async fn schedule_expiry(&self, code: &str, delay: Duration) -> Result<(), QueueError>;

    /// Hands a job that kept failing back to the queue, to be delivered again
    /// after `delay`.
    async fn requeue(&self, job: &Job, delay: Duration) -> Result<(), QueueError>;

    /// Reports whether the queue can currently accept jobs.
    async fn health_check(&self) -> bool;

    /// Name of the backend, for health reports and logs.
    fn backend_name(&self) -> &'static str;
}
