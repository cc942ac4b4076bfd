//! Redis-backed job queue.

use async_trait::async_trait;
use chrono::Utc;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::domain::job::Job;
use crate::domain::job_queue::{JobQueue, QueueError};

/// Maximum jobs of each kind moved per poll.
const PUMP_BATCH: usize = 100;

/// Job queue shared by every instance pointing at the same Redis.
///
/// Redirects are pushed onto the list `<prefix>redirects`. Expiries are added
/// to the sorted set `<prefix>olds`, scored by their due time in unix seconds.
/// [`RedisJobQueue::run_pump`] moves jobs into the local worker channel.
pub struct RedisJobQueue {
    conn: ConnectionManager,
    redirects_key: String,
    olds_key: String,
}

fn backend_error(e: redis::RedisError) -> QueueError {
    QueueError::Backend(e.to_string())
}

impl RedisJobQueue {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Backend`] if the URL is invalid, the connection
    /// cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str, key_prefix: &str) -> Result<Self, QueueError> {
        let client = Client::open(redis_url).map_err(backend_error)?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(backend_error)?;

        let mut test_conn = manager.clone();
        test_conn.ping::<()>().await.map_err(backend_error)?;

        info!("Connected to Redis job queue");

        let (redirects_key, olds_key) = queue_keys(key_prefix);
        Ok(Self {
            conn: manager,
            redirects_key,
            olds_key,
        })
    }

    /// Moves available redirects and due expiries into `tx`.
    ///
    /// An expiry is forwarded only by the caller whose `ZREM` removed it, so
    /// several pumping instances never run the same expiry twice. A job taken
    /// off Redis while the worker channel is closed is put back before
    /// [`QueueError::Closed`] is returned.
    ///
    /// Returns the number of jobs forwarded.
    pub async fn pump_once(&self, tx: &mpsc::Sender<Job>) -> Result<usize, QueueError> {
        let mut conn = self.conn.clone();
        let mut forwarded = 0;

        for _ in 0..PUMP_BATCH {
            let code: Option<String> = redis::cmd("RPOP")
                .arg(&self.redirects_key)
                .query_async(&mut conn)
                .await
                .map_err(backend_error)?;

            let Some(code) = code else { break };
            if let Err(e) = tx.send(Job::count_redirect(code)).await {
                // Back on the consuming end of the list.
                redis::cmd("RPUSH")
                    .arg(&self.redirects_key)
                    .arg(e.0.code())
                    .query_async::<()>(&mut conn)
                    .await
                    .map_err(backend_error)?;
                return Err(QueueError::Closed);
            }
            forwarded += 1;
        }

        let now = Utc::now().timestamp();
        let due: Vec<String> = redis::cmd("ZRANGEBYSCORE")
            .arg(&self.olds_key)
            .arg("-inf")
            .arg(now)
            .arg("LIMIT")
            .arg(0)
            .arg(PUMP_BATCH)
            .query_async(&mut conn)
            .await
            .map_err(backend_error)?;

        for code in due {
            let claimed: i64 = redis::cmd("ZREM")
                .arg(&self.olds_key)
                .arg(&code)
                .query_async(&mut conn)
                .await
                .map_err(backend_error)?;

            if claimed != 1 {
                continue;
            }

            if let Err(e) = tx.send(Job::expire_old(code)).await {
                self.add_expiry(&mut conn, e.0.code(), now).await?;
                return Err(QueueError::Closed);
            }
            forwarded += 1;
        }

        Ok(forwarded)
    }

    /// Removes a pending expiry. Returns `false` if none was scheduled.
    pub async fn cancel_expiry(&self, code: &str) -> Result<bool, QueueError> {
        let mut conn = self.conn.clone();

        let removed: i64 = redis::cmd("ZREM")
            .arg(&self.olds_key)
            .arg(code)
            .query_async(&mut conn)
            .await
            .map_err(backend_error)?;

        Ok(removed == 1)
    }

    async fn add_expiry(
        &self,
        conn: &mut ConnectionManager,
        code: &str,
        due: i64,
    ) -> Result<(), QueueError> {
        redis::cmd("ZADD")
            .arg(&self.olds_key)
            .arg(due)
            .arg(code)
            .query_async::<()>(conn)
            .await
            .map_err(backend_error)
    }

    /// Polls Redis every `poll_interval` until the worker channel closes.
    pub async fn run_pump(self: Arc<Self>, tx: mpsc::Sender<Job>, poll_interval: Duration) {
        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(?poll_interval, "Redis queue pump started");

        loop {
            ticker.tick().await;

            match self.pump_once(&tx).await {
                Ok(0) => {}
                Ok(forwarded) => debug!(forwarded, "Jobs moved from Redis"),
                Err(QueueError::Closed) => break,
                Err(e) => error!("Redis queue pump failed: {}", e),
            }

            if tx.is_closed() {
                break;
            }
        }

        info!("Redis queue pump stopped");
    }
}

#[async_trait]
impl JobQueue for RedisJobQueue {
    async fn enqueue_redirect(&self, code: &str) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();

        redis::cmd("LPUSH")
            .arg(&self.redirects_key)
            .arg(code)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| {
                warn!(code, "Redis LPUSH failed: {}", e);
                backend_error(e)
            })
    }

    async fn schedule_expiry(&self, code: &str, delay: Duration) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();
        let due = due_timestamp(Utc::now().timestamp(), delay);

        self.add_expiry(&mut conn, code, due).await?;

        debug!(code, due, "Expiry scheduled");
        Ok(())
    }

    /// Expiries are scheduled again at `now + delay`. Redirect counts go back
    /// onto the list and are picked up by the next poll.
    async fn requeue(&self, job: &Job, delay: Duration) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();

        match job {
            Job::CountRedirect { code } => redis::cmd("LPUSH")
                .arg(&self.redirects_key)
                .arg(code)
                .query_async::<()>(&mut conn)
                .await
                .map_err(backend_error)?,
            Job::ExpireOld { code } => {
                let due = due_timestamp(Utc::now().timestamp(), delay);
                self.add_expiry(&mut conn, code, due).await?;
            }
        }

        debug!(kind = job.kind(), code = job.code(), "Job requeued");
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.conn.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

fn queue_keys(prefix: &str) -> (String, String) {
    (format!("{}redirects", prefix), format!("{}olds", prefix))
}

fn due_timestamp(now: i64, delay: Duration) -> i64 {
    let delay = i64::try_from(delay.as_secs()).unwrap_or(i64::MAX);
    now.saturating_add(delay)
}
