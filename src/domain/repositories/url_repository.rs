//! Repository trait for URL records and the sequence counter.

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::error::AppError;
use async_trait::async_trait;

/// Builds a shortcut code from a sequence identifier.
pub type CodeForSeed<'a> = dyn Fn(u64) -> Result<String, AppError> + Send + Sync + 'a;

/// Repository interface owning all persisted state.
///
/// Records are addressed by their shortcut code (within a partition derived
/// from it) or by their full URL (within the partition of its host).
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryUrlRepository`] - Process-local implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Finds the live record for a full URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_full_url(
        &self,
        partition_key: &str,
        full_url: &str,
    ) -> Result<Option<UrlRecord>, AppError>;

    /// Finds a record by its shortcut code. Lookups are case-sensitive.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError>;

    /// Stores a record under an explicit code with a zero redirect count,
    /// leaving the sequence counter alone.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the shortcut code or the full URL is
    /// already stored. Returns [`AppError::Internal`] on storage errors.
    async fn create(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError>;

    /// Atomically increments the redirect count of a record.
    ///
    /// Returns `Ok(false)` if the record does not exist.
    async fn increment_redirect_count(&self, code: &str) -> Result<bool, AppError>;

    /// Deletes a record and, only if a row was deleted, decrements the
    /// sequence counter (never below 1), as one atomic step.
    ///
    /// Returns `Ok(false)` if the record does not exist.
    async fn remove_and_release(&self, code: &str) -> Result<bool, AppError>;

    /// Stores a new record under the code built from the current identifier,
    /// advancing the counter, as one atomic step.
    ///
    /// `code_for_seed` turns the identifier into a shortcut code. Two
    /// concurrent callers never receive the same identifier.
    ///
    /// The counter only moves when the record is stored, or when the code is
    /// already held by a live record (the identifier is skipped so the next
    /// call draws a fresh one). Any other failure leaves it untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the code or the full URL is already
    /// stored. Errors from `code_for_seed` are returned as-is. Returns
    /// [`AppError::Internal`] on storage errors.
    async fn create_with_next_identifier<'a>(
        &self,
        partition_key: &str,
        full_url: &str,
        code_for_seed: &'a CodeForSeed<'a>,
    ) -> Result<UrlRecord, AppError>;

    /// Reads the current identifier without changing it.
    async fn current_identifier(&self) -> Result<u64, AppError>;

    /// Number of stored records.
    async fn count(&self) -> Result<i64, AppError>;

    /// Sum of redirect counts across all records.
    async fn total_redirects(&self) -> Result<i64, AppError>;

    /// Checks that the storage backend is reachable.
    async fn health_check(&self) -> bool;
}
