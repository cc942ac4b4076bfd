//! PostgreSQL implementation of the URL repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{FIRST_IDENTIFIER, NewUrlRecord, UrlRecord};
use crate::domain::repositories::url_repository::CodeForSeed;
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::utils::host_prefix::partition_key_for_code;

/// PostgreSQL repository for URL records and the sequence counter.
///
/// The counter lives in the single-row `url_identity` table and is only ever
/// changed by one-statement updates or inside a transaction.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UrlRow {
    shortcut_code: String,
    partition_key: String,
    full_url: String,
    redirect_count: i64,
    created_at: DateTime<Utc>,
}

impl From<UrlRow> for UrlRecord {
    fn from(row: UrlRow) -> Self {
        UrlRecord::new(
            row.shortcut_code,
            row.partition_key,
            row.full_url,
            row.redirect_count,
            row.created_at,
        )
    }
}

fn to_identifier(value: i64) -> Result<u64, AppError> {
    u64::try_from(value).map_err(|_| {
        AppError::internal(
            "Sequence counter out of range",
            json!({ "value": value }),
        )
    })
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn find_by_full_url(
        &self,
        partition_key: &str,
        full_url: &str,
    ) -> Result<Option<UrlRecord>, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT shortcut_code, partition_key, full_url, redirect_count, created_at
            FROM urls
            WHERE partition_key = $1 AND full_url = $2
            "#,
        )
        .bind(partition_key)
        .bind(full_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(UrlRecord::from))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT shortcut_code, partition_key, full_url, redirect_count, created_at
            FROM urls
            WHERE partition_key = $1 AND shortcut_code = $2
            "#,
        )
        .bind(partition_key_for_code(code))
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(UrlRecord::from))
    }

    async fn create(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError> {
        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            INSERT INTO urls (shortcut_code, partition_key, full_url)
            VALUES ($1, $2, $3)
            RETURNING shortcut_code, partition_key, full_url, redirect_count, created_at
            "#,
        )
        .bind(&new_record.shortcut_code)
        .bind(&new_record.partition_key)
        .bind(&new_record.full_url)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn increment_redirect_count(&self, code: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE urls
            SET redirect_count = redirect_count + 1
            WHERE partition_key = $1 AND shortcut_code = $2
            "#,
        )
        .bind(partition_key_for_code(code))
        .bind(code)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_and_release(&self, code: &str) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM urls WHERE shortcut_code = $1")
            .bind(code)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted > 0 {
            sqlx::query(
                r#"
                UPDATE url_identity
                SET current_identifier = GREATEST(current_identifier - 1, 1)
                WHERE id = 1
                "#,
            )
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(deleted > 0)
    }

    async fn create_with_next_identifier<'a>(
        &self,
        partition_key: &str,
        full_url: &str,
        code_for_seed: &'a CodeForSeed<'a>,
    ) -> Result<UrlRecord, AppError> {
        // The counter row stays locked until commit or rollback, which
        // serializes concurrent creations.
        let mut tx = self.pool.begin().await?;

        let issued: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO url_identity (id, current_identifier)
            VALUES (1, 2)
            ON CONFLICT (id) DO UPDATE
            SET current_identifier = url_identity.current_identifier + 1
            RETURNING current_identifier - 1
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        // Dropping `tx` on any early return rolls the increment back.
        let shortcut_code = code_for_seed(to_identifier(issued)?)?;

        let row = sqlx::query_as::<_, UrlRow>(
            r#"
            INSERT INTO urls (shortcut_code, partition_key, full_url)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            RETURNING shortcut_code, partition_key, full_url, redirect_count, created_at
            "#,
        )
        .bind(&shortcut_code)
        .bind(partition_key)
        .bind(full_url)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(row) = row {
            tx.commit().await?;
            return Ok(row.into());
        }

        let url_taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM urls WHERE full_url = $1)")
                .bind(full_url)
                .fetch_one(&mut *tx)
                .await?;

        if url_taken {
            tx.rollback().await?;
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "urls_full_url_key" }),
            ));
        }

        // The code belongs to a live record: keep the increment so the
        // occupied identifier is skipped.
        tx.commit().await?;
        Err(AppError::conflict(
            "Unique constraint violation",
            json!({ "constraint": "urls_pkey", "seed": issued }),
        ))
    }

    async fn current_identifier(&self) -> Result<u64, AppError> {
        let current: Option<i64> =
            sqlx::query_scalar("SELECT current_identifier FROM url_identity WHERE id = 1")
                .fetch_optional(self.pool.as_ref())
                .await?;

        current.map_or(Ok(FIRST_IDENTIFIER), to_identifier)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn total_redirects(&self) -> Result<i64, AppError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(redirect_count), 0)::BIGINT FROM urls")
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(total)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
