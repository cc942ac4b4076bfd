//! Domain layer containing business entities and contracts.
//!
//! Defines the data model and the traits that the infrastructure layer
//! implements, independent of storage and transport concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`job`] - Background job messages
//! - [`job_queue`] - Queue contract for redirect counting and expiry
//!
//! # Background Processing Flow
//!
//! 1. A shortening request creates a record and schedules a [`job::Job::ExpireOld`]
//!    after the retention period
//! 2. Every redirect enqueues a [`job::Job::CountRedirect`]
//! 3. [`crate::application::job_worker::run_job_worker`] consumes both kinds of job

pub mod entities;
pub mod job;
pub mod job_queue;
pub mod repositories;
