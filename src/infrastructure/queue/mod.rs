//! Job queue implementations.
//!
//! - [`InMemoryJobQueue`] - Worker channel plus tokio timers
//! - [`RedisJobQueue`] - Redis list and sorted set, pumped into the worker channel

mod memory_queue;
mod redis_queue;

pub use memory_queue::InMemoryJobQueue;
pub use redis_queue::RedisJobQueue;
